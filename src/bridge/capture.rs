//! Guest-side capture script
//!
//! Rendered once per synthesizer and injected as the diagnostics block.
//! The script reads its generation from the `data-generation` attribute
//! the host stamps on apply, so the rendered text stays the same across
//! documents.

use super::BridgeConfig;
use serde_json::Value;

const CHANNEL_PLACEHOLDER: &str = "__LIVEPANE_CHANNEL__";
const NOISE_PLACEHOLDER: &str = "__LIVEPANE_NOISE__";

const TEMPLATE: &str = r#"(function () {
  var script = document.currentScript;
  var generation = Number(script && script.getAttribute("data-generation")) || 0;
  var channel = __LIVEPANE_CHANNEL__;
  var noise = __LIVEPANE_NOISE__;
  if (window.__livepaneInstalled === generation) return;
  window.__livepaneInstalled = generation;

  var original = window.__livepaneConsole;
  if (!original) {
    original = {};
    ["log", "info", "warn", "error", "debug", "table"].forEach(function (level) {
      original[level] = console[level];
    });
    window.__livepaneConsole = original;
  }
  var reported = {};

  function toPlain(value) {
    if (value === undefined) return null;
    if (value instanceof Error) {
      return { name: value.name, message: value.message, stack: value.stack || null };
    }
    try {
      var seen = [];
      return JSON.parse(JSON.stringify(value, function (key, v) {
        if (typeof v === "object" && v !== null) {
          if (seen.indexOf(v) !== -1) return "[Circular]";
          seen.push(v);
        }
        if (typeof v === "function") return String(v);
        if (typeof v === "bigint") return String(v);
        return v;
      }));
    } catch (e) {
      return String(value);
    }
  }

  function describe(value) {
    if (typeof value === "string") return value;
    if (value instanceof Error) return value.name + ": " + value.message;
    try {
      return JSON.stringify(toPlain(value));
    } catch (e) {
      return String(value);
    }
  }

  function isNoise(message) {
    for (var i = 0; i < noise.length; i++) {
      if (message.indexOf(noise[i]) !== -1) return true;
    }
    return false;
  }

  function send(level, args, extra) {
    if (window.__livepaneInstalled !== generation) return;
    var message = extra && extra.message !== undefined
      ? extra.message
      : Array.prototype.map.call(args, describe).join(" ");
    if (isNoise(message)) return;
    var payload = {
      kind: "diagnostic",
      channel: channel,
      generation: generation,
      level: level,
      message: message,
      args: Array.prototype.map.call(args, toPlain),
      source: extra && extra.source || null,
      line: extra && extra.line || null,
      column: extra && extra.column || null,
      uncaught: !!(extra && extra.uncaught),
      timestamp: Date.now()
    };
    try {
      window.parent.postMessage(payload, "*");
    } catch (e) {}
  }

  ["log", "info", "warn", "error", "debug", "table"].forEach(function (level) {
    var base = original[level] || original.log;
    console[level] = function () {
      send(level, arguments);
      if (base) return base.apply(console, arguments);
    };
  });

  function uncaught(message, source, line, column, value) {
    var key = (source || "") + ":" + (line || 0) + ":" + (column || 0) + ":" + message;
    if (reported[key]) return;
    reported[key] = true;
    send("error", value === undefined ? [] : [value], {
      message: message,
      source: source,
      line: line,
      column: column,
      uncaught: true
    });
  }

  window.addEventListener("error", function (event) {
    uncaught(event.message || "Script error", event.filename, event.lineno, event.colno, event.error);
  });
  window.addEventListener("unhandledrejection", function (event) {
    var reason = event.reason;
    uncaught("Unhandled promise rejection: " + describe(reason), null, 0, 0, reason);
  });
})();"#;

/// Serialize a value as a JS literal that is safe inside a script block
fn js_literal(value: &Value) -> String {
    value.to_string().replace('<', "\\u003c")
}

/// The capture script for the given bridge settings
pub fn capture_script(config: &BridgeConfig) -> String {
    let channel = js_literal(&Value::String(config.channel.clone()));
    let noise = js_literal(&Value::Array(
        config
            .noise_patterns
            .iter()
            .cloned()
            .map(Value::String)
            .collect(),
    ));

    TEMPLATE
        .replace(CHANNEL_PLACEHOLDER, &channel)
        .replace(NOISE_PLACEHOLDER, &noise)
}
