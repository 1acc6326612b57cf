//! The single form page of the interactive shell.

use uuid::Uuid;

use crate::render::{escape_html, fill_template};

/// Which input form is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    UploadText,
    PasteText,
    UploadTriples,
}

impl InputMode {
    fn key(self) -> &'static str {
        match self {
            InputMode::UploadText => "upload",
            InputMode::PasteText => "text",
            InputMode::UploadTriples => "triples",
        }
    }
}

/// What to show in the main area.
#[derive(Debug, Clone)]
pub enum Outcome {
    Empty,
    Success { message: String, artifact_id: Uuid },
    Failure { message: String },
}

const PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>Knowledge Graph From Text or Triples</title>
<style>
*{box-sizing:border-box}
body{margin:0;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',sans-serif;display:flex;min-height:100vh;color:#31333f}
#sidebar{width:320px;flex-shrink:0;background:#f0f2f6;padding:24px 18px}
#sidebar h2{font-size:18px;margin:0 0 12px}
#main{flex:1;padding:24px 32px;min-width:0}
h1{font-size:28px;margin:0 0 18px}
.mode{display:block;margin:6px 0;cursor:pointer}
form.input{display:none;margin-top:18px}
form.input.active{display:block}
textarea{width:100%;height:300px;font:inherit;padding:8px}
button{margin-top:12px;padding:8px 14px;border:1px solid #ccc;border-radius:6px;background:#fff;cursor:pointer}
button:hover{border-color:#ff4b4b;color:#ff4b4b}
.msg{padding:12px 16px;border-radius:6px;margin-bottom:16px}
.success{background:#dff5e3;color:#177233}
.error{background:#fde4e4;color:#9c1c1c}
#loading{display:none;align-items:center;gap:10px;margin-bottom:16px}
.spin{width:20px;height:20px;border:3px solid #ddd;border-top-color:#ff4b4b;border-radius:50%;animation:spin .8s linear infinite}
@keyframes spin{to{transform:rotate(360deg)}}
iframe{width:100%;border:none}
</style>
</head>
<body>
<div id="sidebar">
  <h2>Input method</h2>
  <label class="mode"><input type="radio" name="mode" value="upload"{{CHECKED_UPLOAD}}> Upload txt</label>
  <label class="mode"><input type="radio" name="mode" value="text"{{CHECKED_TEXT}}> Input text</label>
  <label class="mode"><input type="radio" name="mode" value="triples"{{CHECKED_TRIPLES}}> Upload triples (JSON)</label>

  <form class="input" id="form-upload" method="post" action="/generate/upload" enctype="multipart/form-data">
    <input type="file" name="file" accept=".txt,text/plain" required>
    <button type="submit">Generate Knowledge Graph</button>
  </form>
  <form class="input" id="form-text" method="post" action="/generate/text">
    <textarea name="text" placeholder="Input text" required></textarea>
    <button type="submit">Generate Knowledge Graph</button>
  </form>
  <form class="input" id="form-triples" method="post" action="/generate/triples" enctype="multipart/form-data">
    <input type="file" name="file" accept=".json,application/json" required>
    <button type="submit">Generate Knowledge Graph</button>
  </form>
</div>
<div id="main">
  <h1>Knowledge Graph From Text or Triples</h1>
  <div id="loading"><div class="spin"></div><span>Generating knowledge graph...</span></div>
{{OUTCOME}}
</div>
<script>
function show(mode) {
  document.querySelectorAll("form.input").forEach(function (f) {
    f.classList.toggle("active", f.id === "form-" + mode);
  });
}
document.querySelectorAll("input[name=mode]").forEach(function (r) {
  r.addEventListener("change", function () { show(r.value); });
});
document.querySelectorAll("form.input").forEach(function (f) {
  f.addEventListener("submit", function () {
    document.getElementById("loading").style.display = "flex";
  });
});
show("{{MODE}}");
</script>
</body>
</html>
"##;

/// Render the shell page with the given mode selected.
pub fn render(mode: InputMode, outcome: &Outcome, display_height: u32) -> String {
    let checked = |m: InputMode| if m == mode { " checked" } else { "" };

    let outcome_html = match outcome {
        Outcome::Empty => String::new(),
        Outcome::Success {
            message,
            artifact_id,
        } => format!(
            concat!(
                "  <div class=\"msg success\">{}</div>\n",
                "  <iframe src=\"/artifacts/{}\" height=\"{}\"></iframe>"
            ),
            escape_html(message),
            artifact_id,
            display_height
        ),
        Outcome::Failure { message } => format!(
            "  <div class=\"msg error\">\u{274c} {}</div>",
            escape_html(message)
        ),
    };

    fill_template(
        PAGE,
        &[
            ("CHECKED_UPLOAD", checked(InputMode::UploadText)),
            ("CHECKED_TEXT", checked(InputMode::PasteText)),
            ("CHECKED_TRIPLES", checked(InputMode::UploadTriples)),
            ("MODE", mode.key()),
            ("OUTCOME", &outcome_html),
        ],
    )
}
