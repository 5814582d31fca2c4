//! Test utilities for inkhost_guest.

/// Helper to compile WAT to WASM bytes
pub fn wat_to_wasm(wat_source: &str) -> Vec<u8> {
    wat::parse_str(wat_source).expect("Invalid WAT")
}

/// Escape a JSON payload for embedding in a WAT data segment.
fn escape_for_wat(json: &str) -> String {
    json.replace('\\', "\\\\").replace('"', "\\\"")
}

/// A complete playground guest exporting the full `Input.*` and
/// `Compilation.*` table.
///
/// `getCompletions` and `getDiagnosticsAsync` return the given JSON payloads
/// verbatim from fixed memory offsets; `createCompilationAsync` always hands
/// back session id 1.
pub fn playground_guest_wat(completions_json: &str, diagnostics_json: &str) -> String {
    format!(
        r#"
        (module
            (memory (export "memory") 1)
            (func (export "Input.Reset"))
            (func (export "Input.CallMouseDown") (param f64 f64))
            (func (export "Input.CallMouseUp") (param f64 f64))
            (func (export "Input.CallMouseMove") (param f64 f64))
            (func (export "Input.CallResize") (param f64 f64))
            (func (export "Input.CallUpdate") (param f64))
            (func (export "Input.CallPixelRatio") (param f64))
            (func (export "Compilation.createCompilationAsync") (param i32 i32) (result i32)
                (i32.const 1)
            )
            (func (export "Compilation.recompileAsync") (param i32 i32 i32))
            (func (export "Compilation.getCompletions") (param i32 i32) (result i32 i32)
                (i32.const 1024) ;; ptr to completions payload
                (i32.const {completions_len})
            )
            (func (export "Compilation.getDiagnosticsAsync") (param i32) (result i32 i32)
                (i32.const 2048) ;; ptr to diagnostics payload
                (i32.const {diagnostics_len})
            )
            (func (export "alloc") (param i32) (result i32)
                (i32.const 4096) ;; fixed scratch region past the payloads
            )
            (data (i32.const 1024) "{completions}")
            (data (i32.const 2048) "{diagnostics}")
        )
        "#,
        completions_len = completions_json.len(),
        diagnostics_len = diagnostics_json.len(),
        completions = escape_for_wat(completions_json),
        diagnostics = escape_for_wat(diagnostics_json),
    )
}

/// A playground guest whose compilation surface always answers with empty
/// arrays.
pub fn quiet_guest_wat() -> String {
    playground_guest_wat("[]", "[]")
}

/// A playground guest that also takes `Compilation.initAsync`, recording how
/// many bytes of asset payload it received into a readable counter at
/// offset 512.
pub fn init_aware_guest_wat() -> String {
    r#"
        (module
            (memory (export "memory") 1)
            (func (export "Input.Reset"))
            (func (export "Input.CallMouseDown") (param f64 f64))
            (func (export "Input.CallMouseUp") (param f64 f64))
            (func (export "Input.CallMouseMove") (param f64 f64))
            (func (export "Input.CallResize") (param f64 f64))
            (func (export "Input.CallUpdate") (param f64))
            (func (export "Input.CallPixelRatio") (param f64))
            (func (export "Compilation.initAsync") (param i32 i32)
                (i32.store (i32.const 512) (local.get 1))
            )
            (func (export "Compilation.createCompilationAsync") (param i32 i32) (result i32)
                (i32.const 1)
            )
            (func (export "Compilation.recompileAsync") (param i32 i32 i32))
            (func (export "Compilation.getCompletions") (param i32 i32) (result i32 i32)
                (i32.const 1024)
                (i32.const 2)
            )
            (func (export "Compilation.getDiagnosticsAsync") (param i32) (result i32 i32)
                (i32.const 1024)
                (i32.const 2)
            )
            (func (export "alloc") (param i32) (result i32)
                (i32.const 4096)
            )
            (data (i32.const 1024) "[]")
        )
        "#
    .to_string()
}

/// A guest that draws on every `Input.CallUpdate`: sets a fill style from
/// its own memory, begins a path, and fills one rect. Used to exercise the
/// import bridge end to end.
pub fn drawing_guest_wat() -> String {
    let style = "#1e90ff";
    format!(
        r#"
        (module
            (import "context2D" "fillStyle" (func $fill_style (param i32 i32)))
            (import "context2D" "beginPath" (func $begin_path))
            (import "context2D" "fillRect" (func $fill_rect (param f64 f64 f64 f64)))
            (memory (export "memory") 1)
            (func (export "Input.Reset"))
            (func (export "Input.CallMouseDown") (param f64 f64))
            (func (export "Input.CallMouseUp") (param f64 f64))
            (func (export "Input.CallMouseMove") (param f64 f64))
            (func (export "Input.CallResize") (param f64 f64))
            (func (export "Input.CallUpdate") (param f64)
                (call $fill_style (i32.const 0) (i32.const {style_len}))
                (call $begin_path)
                (call $fill_rect (f64.const 10) (f64.const 20) (f64.const 30) (f64.const 40))
            )
            (func (export "Input.CallPixelRatio") (param f64))
            (func (export "Compilation.createCompilationAsync") (param i32 i32) (result i32)
                (i32.const 1)
            )
            (func (export "Compilation.recompileAsync") (param i32 i32 i32))
            (func (export "Compilation.getCompletions") (param i32 i32) (result i32 i32)
                (i32.const 1024)
                (i32.const 2)
            )
            (func (export "Compilation.getDiagnosticsAsync") (param i32) (result i32 i32)
                (i32.const 1024)
                (i32.const 2)
            )
            (func (export "alloc") (param i32) (result i32)
                (i32.const 4096)
            )
            (data (i32.const 0) "{style}")
            (data (i32.const 1024) "[]")
        )
        "#,
        style_len = style.len(),
        style = style,
    )
}
