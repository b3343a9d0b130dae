//! Composition of the sandboxed document and its instrumentation.
//!
//! The same console instrumentation is emitted for two targets: the embedded
//! script runtime, where messages leave through a host op, and a rendered
//! HTML document, where they are posted to the parent window.

use crate::model::buffer::BufferSet;
use crate::model::generation::Generation;

/// Prefix of the diagnostic emitted when the guarded user script throws
pub const SCRIPT_ERROR_PREFIX: &str = "Script Error: ";

/// Name of the op the runtime instrumentation posts through
pub const POST_OP: &str = "op_playground_post";

/// Where instrumented console calls are delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostTarget {
    /// The embedded runtime: JSON payloads through [`POST_OP`]
    Runtime,
    /// A browser frame: `postMessage` to the parent window, stamped with the
    /// generation that produced the document
    ParentWindow(Generation),
}

/// Argument formatting and console wrapping, shared by both targets.
/// Expects a `post(level, data)` function in scope.
const CONSOLE_HOOKS: &str = r#"
  const formatArg = (arg) => {
    if (typeof arg === 'object' && arg !== null) {
      try {
        const json = JSON.stringify(arg, null, 2);
        return json === undefined ? String(arg) : json;
      } catch (_) {
        return String(arg);
      }
    }
    return String(arg);
  };

  const target = globalThis.console || (globalThis.console = {});
  for (const level of ['log', 'warn', 'error']) {
    const original = typeof target[level] === 'function' ? target[level] : null;
    target[level] = function (...args) {
      post(level, args.map(formatArg));
      if (original) {
        original.apply(target, args);
      }
    };
  }
"#;

/// Instrumentation script for `target`
pub fn instrumentation_script(target: PostTarget) -> String {
    let post = match target {
        PostTarget::Runtime => format!(
            "  const post = (level, data) => Deno.core.ops.{}(JSON.stringify({{ type: 'console', level, data }}));\n",
            POST_OP
        ),
        PostTarget::ParentWindow(generation) => format!(
            "  const post = (level, data) => window.parent.postMessage({{ type: 'console', level, data, generation: {} }}, '*');\n",
            generation.0
        ),
    };

    let mut script = String::from("(function () {\n");
    script.push_str(&post);
    script.push_str(CONSOLE_HOOKS);
    if matches!(target, PostTarget::ParentWindow(_)) {
        script.push_str(
            r#"
  window.onerror = function (msg, url, lineNo) {
    post('error', ['Error: ' + msg + ' (Line ' + lineNo + ')']);
    return false;
  };
"#,
        );
    }
    script.push_str("})();\n");
    script
}

/// Wrap the user script so a thrown fault becomes one error-level console
/// call instead of escaping.
pub fn guarded_script(script: &str) -> String {
    format!(
        "try {{\n{}\n}} catch (error) {{\n  console.error('{}' + (error && error.message !== undefined ? error.message : String(error)));\n}}\n",
        script, SCRIPT_ERROR_PREFIX
    )
}

/// The complete HTML document for a rendered-output consumer: styling in
/// the head, markup in the body, then the instrumentation and the guarded
/// script.
pub fn compose_document(generation: Generation, buffers: &BufferSet) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<style>{}</style>\n</head>\n<body>\n{}\n<script>\n{}</script>\n<script>\n{}</script>\n</body>\n</html>\n",
        escape_for_element(buffers.style(), "style"),
        buffers.markup(),
        instrumentation_script(PostTarget::ParentWindow(generation)),
        escape_for_element(&guarded_script(buffers.script()), "script"),
    )
}

/// Keep embedded text from closing its raw-text element early. HTML tag
/// names are case-insensitive, so `</SCRIPT` is escaped too.
fn escape_for_element(text: &str, element: &str) -> String {
    let closing = format!("</{}", element.to_ascii_lowercase());
    // ASCII lowercasing keeps byte offsets aligned with `text`
    let lowered = text.to_ascii_lowercase();
    let mut escaped = String::with_capacity(text.len());
    let mut copied = 0;
    for (start, _) in lowered.match_indices(&closing) {
        let end = start + closing.len();
        escaped.push_str(&text[copied..start]);
        escaped.push_str("<\\/");
        escaped.push_str(&text[start + 2..end]);
        copied = end;
    }
    escaped.push_str(&text[copied..]);
    escaped
}
