use crate::counter::totals;
use crate::models::{CounterState, Direction};
use crate::storage::encode_snapshot;
use crate::variants::{self, Category, Variant};

pub fn render_index() -> String {
    let links: String = variants::ALL
        .iter()
        .map(|variant| {
            format!(
                r#"<a class="nav-card" href="/{slug}"><span>{title}</span></a>"#,
                slug = variant.slug,
                title = variant.title,
            )
        })
        .collect::<Vec<_>>()
        .join("\n        ");

    INDEX_HTML.replace("{{LINKS}}", &links)
}

pub fn render_counter(variant: &Variant, counts: &CounterState, page_id: &str) -> String {
    let sums = totals(counts);
    let snapshot = encode_snapshot(counts).unwrap_or_else(|_| "null".to_string());
    let rows: String = variant
        .categories
        .iter()
        .map(|category| render_row(variant, category, counts))
        .collect::<Vec<_>>()
        .join("\n");

    COUNTER_HTML
        .replace("{{TITLE}}", variant.title)
        .replace("{{SLUG}}", variant.slug)
        .replace("{{PAGE_ID}}", page_id)
        .replace("{{COUNTS}}", &snapshot)
        .replace("{{HELP}}", &help_text(variant))
        .replace("{{ROWS}}", &rows)
        .replace("{{TOTAL_IN}}", &sums.incoming.to_string())
        .replace("{{TOTAL_OUT}}", &sums.outgoing.to_string())
        .replace("{{TOTAL}}", &sums.incoming.saturating_add(sums.outgoing).to_string())
}

fn render_row(variant: &Variant, category: &Category, counts: &CounterState) -> String {
    let entry = counts.get(category.id).copied().unwrap_or_default();
    let button = |direction: Direction, class: &str, value: u64| {
        let field = match direction {
            Direction::Incoming => "incoming",
            Direction::Outgoing => "outgoing",
        };
        format!(
            r#"<form class="count-form" method="post" action="/{slug}/increment">
          <input type="hidden" name="category" value="{id}" />
          <input type="hidden" name="direction" value="{field}" />
          <button class="{class}" type="submit">
            <span class="value" id="{field}-{id}">{value}</span>
            <span class="label">{label}</span>
            <span class="hint">{hint}</span>
          </button>
        </form>"#,
            slug = variant.slug,
            id = category.id,
            label = direction.label(),
            hint = chord_hint(variant, category, direction),
        )
    };

    format!(
        r#"    <section class="category" style="--accent: {color}">
      <h2>{name}</h2>
      <div class="buttons">
        {incoming}
        {outgoing}
      </div>
    </section>"#,
        color = category.color,
        name = category.name,
        incoming = button(Direction::Incoming, "btn-in", entry.incoming),
        outgoing = button(Direction::Outgoing, "btn-out", entry.outgoing),
    )
}

fn chord_hint(variant: &Variant, category: &Category, direction: Direction) -> String {
    let bindings = &variant.bindings;
    let modifier = match direction {
        Direction::Incoming => bindings.incoming,
        Direction::Outgoing => bindings.outgoing,
    };
    match bindings.key_for(category.id) {
        Some(key) => format!("{} + {}", modifier.to_uppercase(), key.to_uppercase()),
        None => modifier.to_uppercase(),
    }
}

fn help_text(variant: &Variant) -> String {
    let bindings = &variant.bindings;
    let reset = bindings.reset.to_uppercase();
    if bindings.direct_modifiers {
        return format!(
            "Drücke <kbd>{}</kbd> für Einfahrend, <kbd>{}</kbd> für Ausfahrend und <kbd>{reset}</kbd> zum Zurücksetzen",
            bindings.incoming.to_uppercase(),
            bindings.outgoing.to_uppercase(),
        );
    }

    format!(
        "Halte <kbd>{}</kbd> (Einfahrend) oder <kbd>{}</kbd> (Ausfahrend) und drücke die Taste der Kategorie. <kbd>{reset}</kbd> setzt alle Zähler zurück",
        bindings.incoming.to_uppercase(),
        bindings.outgoing.to_uppercase(),
    )
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="de">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Zähler</title>
  <style>
    body {
      margin: 0;
      min-height: 100vh;
      background: #111827;
      color: white;
      font-family: system-ui, sans-serif;
      display: grid;
      place-items: center;
      padding: 16px;
    }

    h1 {
      font-size: 3rem;
      margin: 0 0 8px;
      text-align: center;
    }

    p {
      color: #9ca3af;
      text-align: center;
      margin: 0 0 40px;
    }

    nav {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 24px;
      width: min(900px, 100%);
    }

    .nav-card {
      background: #1f2937;
      border: 1px solid #374151;
      border-radius: 16px;
      height: 200px;
      display: grid;
      place-items: center;
      color: white;
      font-size: 1.5rem;
      font-weight: 700;
      text-decoration: none;
      transition: transform 200ms ease, border-color 200ms ease;
    }

    .nav-card:hover {
      transform: scale(1.04);
      border-color: #6b7280;
    }
  </style>
</head>
<body>
  <main>
    <h1>Zähler</h1>
    <p>Wählen Sie einen Zähler</p>
    <nav>
        {{LINKS}}
    </nav>
  </main>
</body>
</html>
"#;

const COUNTER_HTML: &str = r#"<!DOCTYPE html>
<html lang="de">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: black;
      color: #e5e7eb;
      font-family: system-ui, sans-serif;
      padding: 16px;
    }

    .app {
      max-width: 1100px;
      margin: 0 auto;
      display: grid;
      gap: 20px;
    }

    a.back {
      color: #d1d5db;
      text-decoration: none;
    }

    header {
      border: 1px solid #6b7280;
      border-radius: 12px;
      padding: 24px;
      text-align: center;
    }

    h1 {
      margin: 0 0 8px;
      font-size: 2rem;
    }

    kbd {
      font-family: ui-monospace, monospace;
      background: #374151;
      border-radius: 4px;
      padding: 2px 8px;
    }

    .totals {
      display: grid;
      grid-template-columns: repeat(3, 1fr);
      gap: 12px;
      margin-top: 20px;
    }

    .totals .value {
      display: block;
      font-size: 1.6rem;
      font-weight: 700;
    }

    .totals .label,
    .last-action {
      color: #9ca3af;
      font-size: 0.9rem;
    }

    .last-action {
      min-height: 1.2em;
      margin-top: 12px;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(240px, 1fr));
      gap: 16px;
    }

    .category {
      border: 1px solid #374151;
      border-top: 4px solid var(--accent);
      border-radius: 12px;
      padding: 16px;
    }

    .category h2 {
      margin: 0 0 12px;
      font-size: 1.1rem;
      color: var(--accent);
      filter: brightness(1.6);
    }

    .buttons {
      display: grid;
      grid-template-columns: 1fr 1fr;
      gap: 8px;
    }

    .count-form {
      margin: 0;
    }

    button {
      width: 100%;
      border: none;
      border-radius: 8px;
      padding: 12px;
      color: white;
      cursor: pointer;
      display: grid;
      gap: 2px;
    }

    button .value {
      font-size: 1.5rem;
      font-weight: 700;
    }

    button .hint {
      font-size: 0.75rem;
      opacity: 0.75;
    }

    .btn-in {
      background: #16a34a;
    }

    .btn-out {
      background: #dc2626;
    }

    .btn-reset {
      background: #4b5563;
      width: auto;
      margin: 16px auto 0;
      padding: 10px 24px;
    }
  </style>
</head>
<body>
  <main class="app">
    <a class="back" href="/">&larr; Zurück zur Hauptseite</a>

    <header>
      <h1>{{TITLE}}</h1>
      <p>{{HELP}}</p>
      <div class="totals">
        <div><span class="value" id="total-incoming">{{TOTAL_IN}}</span><span class="label">Einfahrend</span></div>
        <div><span class="value" id="total-outgoing">{{TOTAL_OUT}}</span><span class="label">Ausfahrend</span></div>
        <div><span class="value" id="total">{{TOTAL}}</span><span class="label">Gesamt</span></div>
      </div>
      <div class="last-action" id="last-action"></div>
      <form id="reset-form" method="post" action="/{{SLUG}}/reset">
        <button class="btn-reset" type="submit">Zurücksetzen</button>
      </form>
    </header>

    <div class="grid">
{{ROWS}}
    </div>
  </main>

  <script>
    const slug = '{{SLUG}}';
    const page = '{{PAGE_ID}}';
    const lastActionEl = document.getElementById('last-action');
    let counts = {{COUNTS}};
    let queue = Promise.resolve();

    const render = (data) => {
      counts = data.counts;
      data.categories.forEach((category) => {
        document.getElementById(`incoming-${category.id}`).textContent = category.incoming;
        document.getElementById(`outgoing-${category.id}`).textContent = category.outgoing;
      });
      document.getElementById('total-incoming').textContent = data.totals.incoming;
      document.getElementById('total-outgoing').textContent = data.totals.outgoing;
      document.getElementById('total').textContent = data.totals.incoming + data.totals.outgoing;
      if (data.last_action) {
        lastActionEl.textContent = `Letzte Aktion: ${data.last_action}`;
      }
    };

    // counts are read when the request leaves, after the previous answer landed
    const post = (path, fields) => {
      queue = queue
        .then(() =>
          fetch(`/api/${slug}/${path}`, {
            method: 'POST',
            headers: { 'content-type': 'application/json' },
            body: JSON.stringify({ ...fields, counts })
          })
        )
        .then((res) => (res.ok ? res.json() : null))
        .then((data) => data && render(data))
        .catch(() => {});
      return queue;
    };

    document.querySelectorAll('.count-form').forEach((form) => {
      form.addEventListener('submit', (event) => {
        event.preventDefault();
        post('increment', {
          category: Number(form.elements.category.value),
          direction: form.elements.direction.value
        });
      });
    });

    document.getElementById('reset-form').addEventListener('submit', (event) => {
      event.preventDefault();
      post('reset', {});
    });

    window.addEventListener('keydown', (event) => {
      if (event.ctrlKey || event.metaKey || event.altKey) {
        return;
      }
      post('keys', { page, key: event.key, event: 'down' });
    });
    // key-ups always go out, or a key released under Ctrl would stay held
    window.addEventListener('keyup', (event) => post('keys', { page, key: event.key, event: 'up' }));
    window.addEventListener('blur', () => post('keys', { page, key: '', event: 'blur' }));
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::{increment, zeroed};
    use crate::models::CategoryId;
    use crate::variants::{EASY, STREET, TRAIN};

    #[test]
    fn counter_page_shows_counts_and_totals() {
        let counts = increment(&zeroed(&STREET), CategoryId(4), Direction::Outgoing);
        let html = render_counter(&STREET, &counts, "page-1");

        assert!(html.contains("Kraftomnibusse"));
        assert!(html.contains(r#"id="outgoing-4">1</span>"#));
        assert!(html.contains(r#"id="total-outgoing">1</span>"#));
        assert!(html.contains("E + 4"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn counter_page_carries_its_counts_and_page_id() {
        let counts = increment(&zeroed(&STREET), CategoryId(2), Direction::Incoming);
        let html = render_counter(&STREET, &counts, "4f1c");

        assert!(html.contains("const page = '4f1c';"));
        let snapshot = encode_snapshot(&counts).unwrap();
        assert!(html.contains(&format!("let counts = {snapshot};")));
    }

    #[test]
    fn only_key_downs_are_filtered_for_system_modifiers() {
        let html = render_counter(&STREET, &zeroed(&STREET), "page-3");
        let keyup = html
            .lines()
            .find(|line| line.contains("addEventListener('keyup'"))
            .expect("missing keyup listener");

        assert!(keyup.contains("event: 'up'"));
        assert!(!keyup.contains("ctrlKey"));
        assert_eq!(html.matches("event.ctrlKey").count(), 1);
    }

    #[test]
    fn easy_page_hints_single_keys() {
        let html = render_counter(&EASY, &zeroed(&EASY), "page-2");
        assert!(html.contains(r#"<span class="hint">E</span>"#));
        assert!(html.contains("zum Zurücksetzen"));
    }

    #[test]
    fn index_links_every_counter() {
        let html = render_index();
        for variant in [&STREET, &EASY, &TRAIN] {
            assert!(html.contains(&format!("href=\"/{}\"", variant.slug)));
        }
    }
}
