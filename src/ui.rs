use crate::calendar::WEEKDAY_LABELS;

pub fn render_index() -> String {
    let weekdays: String = WEEKDAY_LABELS
        .iter()
        .map(|label| format!("<div class=\"weekday\">{label}</div>"))
        .collect();
    INDEX_HTML.replace("{{WEEKDAYS}}", &weekdays)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Checklist Calendar</title>
  <style>
    :root {
      --bg: #0f172a;
      --card: #1e293b;
      --cell: rgba(15, 23, 42, 0.5);
      --ink: #e2e8f0;
      --muted: #94a3b8;
      --checked: #059669;
      --today: #0ea5e9;
      --danger: #f87171;
      --shadow: 0 24px 60px rgba(2, 6, 23, 0.5);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: system-ui, "Segoe UI", sans-serif;
      display: grid;
      place-items: center;
      padding: 24px 12px 40px;
    }

    .app {
      width: min(760px, 100%);
      display: grid;
      gap: 20px;
    }

    h1 {
      margin: 0;
      text-align: center;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
      color: #34d399;
    }

    .card {
      background: var(--card);
      border-radius: 16px;
      box-shadow: var(--shadow);
      padding: 16px;
    }

    .toolbar {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
      padding-bottom: 12px;
    }

    .toolbar h2 {
      margin: 0;
      font-size: 1.3rem;
    }

    .user {
      color: var(--muted);
      font-size: 0.9rem;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 8px 14px;
      font-weight: 600;
      cursor: pointer;
      background: #334155;
      color: var(--ink);
    }

    button.primary {
      background: var(--checked);
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 6px;
    }

    .weekday {
      text-align: center;
      font-size: 0.75rem;
      font-weight: 700;
      color: var(--muted);
      padding: 6px 0;
    }

    .day {
      height: 64px;
      border-radius: 10px;
      background: var(--cell);
      display: flex;
      align-items: center;
      justify-content: center;
      cursor: pointer;
      position: relative;
    }

    .day.empty {
      background: transparent;
      cursor: default;
    }

    .day.checked {
      background: var(--checked);
    }

    .day.checked::after {
      content: "\2713";
      position: absolute;
      right: 8px;
      bottom: 4px;
      font-size: 0.9rem;
    }

    .day .num {
      width: 32px;
      height: 32px;
      border-radius: 50%;
      display: grid;
      place-items: center;
    }

    .day.today .num {
      background: var(--today);
      font-weight: 700;
    }

    form {
      display: grid;
      gap: 12px;
    }

    input {
      padding: 10px 12px;
      border-radius: 8px;
      border: 1px solid #334155;
      background: var(--bg);
      color: var(--ink);
    }

    .status {
      min-height: 1.2em;
      white-space: pre-line;
      color: var(--muted);
    }

    .status[data-type="error"] {
      color: var(--danger);
    }

    dialog {
      border: none;
      border-radius: 16px;
      background: var(--card);
      color: var(--ink);
      max-width: 420px;
    }

    dialog .buttons {
      display: flex;
      justify-content: flex-end;
      gap: 8px;
      margin-top: 16px;
    }

    [hidden] {
      display: none !important;
    }
  </style>
</head>
<body>
  <main class="app">
    <h1>Checklist Calendar</h1>

    <section class="card" id="sign-in" hidden>
      <form id="sign-in-form">
        <input id="email" type="email" placeholder="you@example.com" required />
        <input id="password" type="password" placeholder="Password" required />
        <button class="primary" type="submit">Sign in</button>
      </form>
    </section>

    <section class="card" id="calendar" hidden>
      <div class="toolbar">
        <div>
          <button id="sign-out" type="button">Sign out</button>
          <span class="user" id="user"></span>
        </div>
        <h2 id="title"></h2>
        <div>
          <button id="prev" type="button" aria-label="Previous month">&larr;</button>
          <button id="next" type="button" aria-label="Next month">&rarr;</button>
        </div>
      </div>
      <div class="grid">{{WEEKDAYS}}</div>
      <div class="grid" id="days"></div>
    </section>

    <p class="status" id="status"></p>
  </main>

  <dialog id="confirm">
    <h3>Uncheck this date?</h3>
    <p id="confirm-text"></p>
    <div class="buttons">
      <button id="confirm-cancel" type="button">Keep it</button>
      <button id="confirm-ok" class="primary" type="button">Uncheck</button>
    </div>
  </dialog>

  <script>
    const statusEl = document.getElementById('status');
    const signInEl = document.getElementById('sign-in');
    const calendarEl = document.getElementById('calendar');
    const daysEl = document.getElementById('days');
    const titleEl = document.getElementById('title');
    const userEl = document.getElementById('user');
    const dialog = document.getElementById('confirm');

    const now = new Date();
    let view = { year: now.getFullYear(), month: now.getMonth() + 1 };

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const request = async (method, url, body) => {
      const res = await fetch(url, {
        method,
        headers: body ? { 'content-type': 'application/json' } : {},
        body: body ? JSON.stringify(body) : undefined
      });
      if (!res.ok) {
        const msg = await res.text();
        const err = new Error(msg || 'Request failed');
        err.status = res.status;
        throw err;
      }
      return res.status === 204 ? null : res.json();
    };

    const showSignedOut = () => {
      calendarEl.hidden = true;
      signInEl.hidden = false;
    };

    const renderCalendar = (data) => {
      titleEl.textContent = data.title;
      view = { year: data.year, month: data.month };
      daysEl.innerHTML = '';
      data.days.forEach((day) => {
        const cell = document.createElement('div');
        if (!day) {
          cell.className = 'day empty';
        } else {
          cell.className = 'day';
          cell.classList.toggle('checked', day.is_checked);
          cell.classList.toggle('today', day.is_today);
          cell.setAttribute('role', 'button');
          cell.setAttribute('aria-pressed', String(day.is_checked));
          cell.innerHTML = `<span class="num">${day.day}</span>`;
          cell.addEventListener('click', () => toggle(day.date));
        }
        daysEl.appendChild(cell);
      });
      if (data.notice) {
        setStatus(data.notice, 'error');
      }
    };

    const loadCalendar = async () => {
      try {
        renderCalendar(await request('GET', `/api/calendar?year=${view.year}&month=${view.month}`));
      } catch (err) {
        if (err.status === 401) {
          showSignedOut();
        } else {
          setStatus(err.message, 'error');
        }
      }
    };

    const toggle = async (date) => {
      try {
        const result = await request('POST', `/api/dates/${date}/toggle`);
        if (result.outcome === 'confirm_required') {
          document.getElementById('confirm-text').textContent = `${date} is already marked as done.`;
          dialog.showModal();
        }
      } catch (err) {
        setStatus(err.message, 'error');
      }
      await loadCalendar();
    };

    document.getElementById('confirm-ok').addEventListener('click', async () => {
      dialog.close();
      try {
        await request('POST', '/api/confirmation');
      } catch (err) {
        setStatus(err.message, 'error');
      }
      await loadCalendar();
    });

    document.getElementById('confirm-cancel').addEventListener('click', async () => {
      dialog.close();
      await request('DELETE', '/api/confirmation').catch(() => {});
    });

    document.getElementById('prev').addEventListener('click', () => {
      view.month -= 1;
      loadCalendar();
    });

    document.getElementById('next').addEventListener('click', () => {
      view.month += 1;
      loadCalendar();
    });

    document.getElementById('sign-out').addEventListener('click', async () => {
      await request('DELETE', '/api/session').catch(() => {});
      setStatus('', '');
      showSignedOut();
    });

    document.getElementById('sign-in-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      setStatus('Signing in...', 'info');
      try {
        const session = await request('POST', '/api/session', {
          email: document.getElementById('email').value,
          password: document.getElementById('password').value
        });
        setStatus('', '');
        start(session);
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    const start = (session) => {
      if (!session.signed_in) {
        showSignedOut();
        return;
      }
      userEl.textContent = session.email || '';
      signInEl.hidden = true;
      calendarEl.hidden = false;
      loadCalendar();
    };

    request('GET', '/api/session')
      .then(start)
      .catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_header_starts_on_sunday() {
        let page = render_index();
        assert!(!page.contains("{{WEEKDAYS}}"));
        let sun = page.find(">Sun<").unwrap();
        let sat = page.find(">Sat<").unwrap();
        assert!(sun < sat);
    }
}
