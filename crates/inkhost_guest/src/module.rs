//! Wasmi-backed guest module.
//!
//! Loads the guest binary, installs the import bridge before instantiation,
//! and resolves the typed export table the host drives: the `Input.*` event
//! entry points and the `Compilation.*` session surface. Payloads cross the
//! boundary as UTF-8 JSON written into guest memory through the guest's
//! `alloc` export and read back as ptr/len pairs.

use parking_lot::Mutex;
use tracing::{debug, info};
use wasmi::{
    Config, Engine, Extern, Linker, Memory, Module, Store, StoreLimits, StoreLimitsBuilder,
    TypedFunc,
};

use inkhost_surface::SharedContext2D;

use crate::bridge::install_import_bridge;
use crate::engine::CompilationEngine;
use crate::wire::{CompilationId, CompletionItem, Diagnostic};
use crate::GuestError;

/// Default memory limit for the guest instance (128 MB).
const DEFAULT_MEMORY_LIMIT_BYTES: usize = 128 * 1024 * 1024;

/// Default fuel limit per host-initiated call (instructions).
/// Generous enough for any reasonable frame or recompilation, but stops
/// runaway guest loops from hanging the event loop.
const DEFAULT_FUEL_LIMIT: u64 = 1_000_000_000;

/// Host state for the wasmi store.
pub struct HostState {
    /// Guest memory (set after instantiation).
    pub(crate) memory: Option<Memory>,
    /// Drawing surface handle; `None` until the surface provider resolves.
    pub(crate) surface: Option<SharedContext2D>,
    /// Resource limits for the store.
    limits: StoreLimits,
}

impl HostState {
    fn new(surface: Option<SharedContext2D>) -> Self {
        Self {
            memory: None,
            surface,
            limits: StoreLimitsBuilder::new()
                .memory_size(DEFAULT_MEMORY_LIMIT_BYTES)
                .build(),
        }
    }
}

/// The typed export table the host drives.
#[derive(Copy, Clone)]
struct ExportTable {
    reset: TypedFunc<(), ()>,
    mouse_down: TypedFunc<(f64, f64), ()>,
    mouse_up: TypedFunc<(f64, f64), ()>,
    mouse_move: TypedFunc<(f64, f64), ()>,
    resize: TypedFunc<(f64, f64), ()>,
    update: TypedFunc<f64, ()>,
    pixel_ratio: TypedFunc<f64, ()>,
    create_compilation: TypedFunc<(i32, i32), i32>,
    get_completions: TypedFunc<(i32, i32), (i32, i32)>,
    get_diagnostics: TypedFunc<i32, (i32, i32)>,
    recompile: TypedFunc<(i32, i32, i32), ()>,
    /// Optional asset initialization entry point.
    init: Option<TypedFunc<(i32, i32), ()>>,
    alloc: TypedFunc<i32, i32>,
}

struct Inner {
    store: Store<HostState>,
    exports: ExportTable,
}

/// A loaded guest module with a resolved export table.
///
/// All calls serialize through the store lock; the export table itself is
/// immutable after instantiation.
pub struct GuestModule {
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for GuestModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuestModule").finish_non_exhaustive()
    }
}

impl GuestModule {
    /// Instantiates the guest from its wasm binary.
    ///
    /// The import bridge is installed before instantiation because the
    /// guest resolves its imports eagerly during startup. The surface
    /// handle may be `None`, in which case drawing calls are dropped until
    /// a later bootstrap installs one via a fresh instantiation.
    pub fn instantiate(
        wasm_bytes: &[u8],
        surface: Option<SharedContext2D>,
    ) -> Result<Self, GuestError> {
        info!("Instantiating guest module ({} bytes)", wasm_bytes.len());

        let mut config = Config::default();
        config.consume_fuel(true);
        let engine = Engine::new(&config);

        let module = Module::new(&engine, wasm_bytes)
            .map_err(|e| GuestError::load(format!("Failed to compile module: {}", e)))?;

        let mut store = Store::new(&engine, HostState::new(surface));
        store.limiter(|state| &mut state.limits);
        store
            .set_fuel(DEFAULT_FUEL_LIMIT)
            .map_err(|e| GuestError::load(format!("Failed to set fuel: {}", e)))?;

        let mut linker = <Linker<HostState>>::new(&engine);
        install_import_bridge(&mut linker)?;

        let instance = linker
            .instantiate_and_start(&mut store, &module)
            .map_err(|e| GuestError::load(format!("Failed to instantiate and start: {}", e)))?;

        if let Some(Extern::Memory(memory)) = instance.get_export(&store, "memory") {
            store.data_mut().memory = Some(memory);
        } else {
            return Err(GuestError::load("Module does not export memory"));
        }

        let exports = ExportTable {
            reset: typed_export(&instance, &store, "Input.Reset")?,
            mouse_down: typed_export(&instance, &store, "Input.CallMouseDown")?,
            mouse_up: typed_export(&instance, &store, "Input.CallMouseUp")?,
            mouse_move: typed_export(&instance, &store, "Input.CallMouseMove")?,
            resize: typed_export(&instance, &store, "Input.CallResize")?,
            update: typed_export(&instance, &store, "Input.CallUpdate")?,
            pixel_ratio: typed_export(&instance, &store, "Input.CallPixelRatio")?,
            create_compilation: typed_export(
                &instance,
                &store,
                "Compilation.createCompilationAsync",
            )?,
            get_completions: typed_export(&instance, &store, "Compilation.getCompletions")?,
            get_diagnostics: typed_export(&instance, &store, "Compilation.getDiagnosticsAsync")?,
            recompile: typed_export(&instance, &store, "Compilation.recompileAsync")?,
            init: instance
                .get_typed_func::<(i32, i32), ()>(&store, "Compilation.initAsync")
                .ok(),
            alloc: typed_export(&instance, &store, "alloc")?,
        };

        debug!("Guest export table resolved");

        Ok(Self { inner: Mutex::new(Inner { store, exports }) })
    }

    /// Clears the guest's own callback registrations. Idempotent.
    pub fn reset(&self) -> Result<(), GuestError> {
        let inner = &mut *self.inner.lock();
        refuel(&mut inner.store)?;
        inner
            .exports
            .reset
            .call(&mut inner.store, ())
            .map_err(|e| GuestError::call(format!("Input.Reset failed: {}", e)))
    }

    pub fn call_mouse_down(&self, x: f64, y: f64) -> Result<(), GuestError> {
        self.call_pointer("Input.CallMouseDown", |t| t.mouse_down, x, y)
    }

    pub fn call_mouse_up(&self, x: f64, y: f64) -> Result<(), GuestError> {
        self.call_pointer("Input.CallMouseUp", |t| t.mouse_up, x, y)
    }

    pub fn call_mouse_move(&self, x: f64, y: f64) -> Result<(), GuestError> {
        self.call_pointer("Input.CallMouseMove", |t| t.mouse_move, x, y)
    }

    pub fn call_resize(&self, width: f64, height: f64) -> Result<(), GuestError> {
        self.call_pointer("Input.CallResize", |t| t.resize, width, height)
    }

    pub fn call_update(&self, delta_seconds: f64) -> Result<(), GuestError> {
        let inner = &mut *self.inner.lock();
        refuel(&mut inner.store)?;
        inner
            .exports
            .update
            .call(&mut inner.store, delta_seconds)
            .map_err(|e| GuestError::call(format!("Input.CallUpdate failed: {}", e)))
    }

    pub fn call_pixel_ratio(&self, ratio: f64) -> Result<(), GuestError> {
        let inner = &mut *self.inner.lock();
        refuel(&mut inner.store)?;
        inner
            .exports
            .pixel_ratio
            .call(&mut inner.store, ratio)
            .map_err(|e| GuestError::call(format!("Input.CallPixelRatio failed: {}", e)))
    }

    /// Passes the resolved asset URL list to the guest, if it takes one.
    pub fn init_assets(&self, urls: &[String]) -> Result<(), GuestError> {
        let inner = &mut *self.inner.lock();
        let Some(init) = inner.exports.init else {
            debug!("Guest exports no Compilation.initAsync; skipping asset handoff");
            return Ok(());
        };
        refuel(&mut inner.store)?;
        let payload = serde_json::to_vec(urls)?;
        let alloc = inner.exports.alloc;
        let (ptr, len) = write_bytes(&mut inner.store, &alloc, &payload)?;
        init.call(&mut inner.store, (ptr, len))
            .map_err(|e| GuestError::call(format!("Compilation.initAsync failed: {}", e)))
    }

    fn call_pointer(
        &self,
        name: &str,
        select: impl Fn(&ExportTable) -> TypedFunc<(f64, f64), ()>,
        x: f64,
        y: f64,
    ) -> Result<(), GuestError> {
        let inner = &mut *self.inner.lock();
        refuel(&mut inner.store)?;
        let func = select(&inner.exports);
        func.call(&mut inner.store, (x, y))
            .map_err(|e| GuestError::call(format!("{} failed: {}", name, e)))
    }
}

impl CompilationEngine for GuestModule {
    fn create_compilation(&self, initial_text: &str) -> Result<CompilationId, GuestError> {
        let inner = &mut *self.inner.lock();
        refuel(&mut inner.store)?;
        let alloc = inner.exports.alloc;
        let (ptr, len) = write_bytes(&mut inner.store, &alloc, initial_text.as_bytes())?;
        let session = inner
            .exports
            .create_compilation
            .call(&mut inner.store, (ptr, len))
            .map_err(|e| {
                GuestError::call(format!("Compilation.createCompilationAsync failed: {}", e))
            })?;
        Ok(CompilationId(session))
    }

    fn recompile(&self, session: CompilationId, text: &str) -> Result<(), GuestError> {
        let inner = &mut *self.inner.lock();
        refuel(&mut inner.store)?;
        let alloc = inner.exports.alloc;
        let (ptr, len) = write_bytes(&mut inner.store, &alloc, text.as_bytes())?;
        inner
            .exports
            .recompile
            .call(&mut inner.store, (session.0, ptr, len))
            .map_err(|e| GuestError::call(format!("Compilation.recompileAsync failed: {}", e)))
    }

    fn get_completions(
        &self,
        session: CompilationId,
        offset: u32,
    ) -> Result<Vec<CompletionItem>, GuestError> {
        let inner = &mut *self.inner.lock();
        refuel(&mut inner.store)?;
        let (ptr, len) = inner
            .exports
            .get_completions
            .call(&mut inner.store, (session.0, offset as i32))
            .map_err(|e| GuestError::call(format!("Compilation.getCompletions failed: {}", e)))?;
        let bytes = read_bytes(&inner.store, ptr, len)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| GuestError::invalid_payload(format!("completions: {}", e)))
    }

    fn get_diagnostics(&self, session: CompilationId) -> Result<Vec<Diagnostic>, GuestError> {
        let inner = &mut *self.inner.lock();
        refuel(&mut inner.store)?;
        let (ptr, len) = inner
            .exports
            .get_diagnostics
            .call(&mut inner.store, session.0)
            .map_err(|e| {
                GuestError::call(format!("Compilation.getDiagnosticsAsync failed: {}", e))
            })?;
        let bytes = read_bytes(&inner.store, ptr, len)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| GuestError::invalid_payload(format!("diagnostics: {}", e)))
    }
}

fn typed_export<P, R>(
    instance: &wasmi::Instance,
    store: &Store<HostState>,
    name: &str,
) -> Result<TypedFunc<P, R>, GuestError>
where
    P: wasmi::WasmParams,
    R: wasmi::WasmResults,
{
    instance
        .get_typed_func::<P, R>(store, name)
        .map_err(|e| GuestError::load(format!("{} not found: {}", name, e)))
}

fn refuel(store: &mut Store<HostState>) -> Result<(), GuestError> {
    store
        .set_fuel(DEFAULT_FUEL_LIMIT)
        .map_err(|e| GuestError::call(format!("Failed to set fuel: {}", e)))
}

fn out_of_bounds() -> GuestError {
    GuestError::call("Memory access out of bounds")
}

/// Reads a byte range from guest memory. A negative or overflowing range
/// from a misbehaving guest is a call error, never a panic.
fn read_bytes(store: &Store<HostState>, ptr: i32, len: i32) -> Result<Vec<u8>, GuestError> {
    let memory = store
        .data()
        .memory
        .ok_or_else(|| GuestError::call("Memory not initialized"))?;

    let start = usize::try_from(ptr).map_err(|_| out_of_bounds())?;
    let len = usize::try_from(len).map_err(|_| out_of_bounds())?;
    let end = start.checked_add(len).ok_or_else(out_of_bounds)?;
    let data = memory.data(store).get(start..end).ok_or_else(out_of_bounds)?;

    Ok(data.to_vec())
}

/// Writes bytes into guest memory through the guest's allocator.
fn write_bytes(
    store: &mut Store<HostState>,
    alloc: &TypedFunc<i32, i32>,
    data: &[u8],
) -> Result<(i32, i32), GuestError> {
    let len = data.len() as i32;

    let ptr = alloc
        .call(&mut *store, len)
        .map_err(|e| GuestError::call(format!("Allocation failed: {}", e)))?;

    let memory = store
        .data()
        .memory
        .ok_or_else(|| GuestError::call("Memory not initialized"))?;

    let start = usize::try_from(ptr).map_err(|_| out_of_bounds())?;
    let end = start.checked_add(data.len()).ok_or_else(out_of_bounds)?;
    memory
        .data_mut(&mut *store)
        .get_mut(start..end)
        .ok_or_else(out_of_bounds)?
        .copy_from_slice(data);

    Ok((ptr, len))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    use inkhost_surface::{DrawCommand, RecordingSurface, SharedContext2D};

    use crate::test_utils::{
        drawing_guest_wat, init_aware_guest_wat, playground_guest_wat, quiet_guest_wat,
        wat_to_wasm,
    };
    use crate::wire::Severity;

    use super::*;

    fn recording_surface() -> (SharedContext2D, Arc<Mutex<RecordingSurface>>) {
        let surface = Arc::new(Mutex::new(RecordingSurface::new()));
        let shared: SharedContext2D = surface.clone();
        (shared, surface)
    }

    #[test]
    fn instantiates_and_drives_input_exports() {
        let wasm = wat_to_wasm(&quiet_guest_wat());
        let module = GuestModule::instantiate(&wasm, None).expect("Failed to instantiate");

        module.reset().expect("reset");
        module.call_mouse_down(40.0, 30.0).expect("mouse down");
        module.call_mouse_up(40.0, 30.0).expect("mouse up");
        module.call_mouse_move(41.0, 29.0).expect("mouse move");
        module.call_resize(800.0, 600.0).expect("resize");
        module.call_update(0.016).expect("update");
        module.call_pixel_ratio(2.0).expect("pixel ratio");
    }

    #[test]
    fn compilation_round_trip() {
        let completions = r#"[{"displayText":"Console","tags":["Class"]}]"#;
        let diagnostics =
            r#"[{"start":0,"end":4,"message":"; expected","severity":"Error"}]"#;
        let wasm = wat_to_wasm(&playground_guest_wat(completions, diagnostics));
        let module = GuestModule::instantiate(&wasm, None).expect("Failed to instantiate");

        let session = module.create_compilation("var x = 1").expect("create");
        assert_eq!(session, CompilationId(1));

        module.recompile(session, "var x = 2;").expect("recompile");

        let items = module.get_completions(session, 3).expect("completions");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].display_text, "Console");
        assert_eq!(items[0].tags, vec!["Class".to_string()]);

        let diags = module.get_diagnostics(session).expect("diagnostics");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "; expected");
        assert_eq!(diags[0].severity, Severity::Error);
    }

    #[test]
    fn empty_payloads_parse_to_empty_vecs() {
        let wasm = wat_to_wasm(&quiet_guest_wat());
        let module = GuestModule::instantiate(&wasm, None).expect("Failed to instantiate");

        let session = module.create_compilation("").expect("create");
        assert!(module.get_completions(session, 0).expect("completions").is_empty());
        assert!(module.get_diagnostics(session).expect("diagnostics").is_empty());
    }

    #[test]
    fn hostile_payload_range_is_a_call_error() {
        // Compilation results pointing past addressable memory, or at a
        // negative offset, must come back as errors rather than panics.
        let wasm = wat_to_wasm(
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
                (i32.const 2147483647)
                (i32.const 8)
            )
            (func (export "Compilation.getDiagnosticsAsync") (param i32) (result i32 i32)
                (i32.const -16)
                (i32.const 8)
            )
            (func (export "alloc") (param i32) (result i32) (i32.const 4096))
        )
        "#,
        );
        let module = GuestModule::instantiate(&wasm, None).expect("Failed to instantiate");
        let session = module.create_compilation("").expect("create");

        assert!(matches!(
            module.get_completions(session, 0),
            Err(GuestError::CallError(_))
        ));
        assert!(matches!(
            module.get_diagnostics(session),
            Err(GuestError::CallError(_))
        ));
    }

    #[test]
    fn missing_export_is_a_load_error() {
        let wasm = wat_to_wasm(
            r#"
        (module
            (memory (export "memory") 1)
            (func (export "Input.Reset"))
            (func (export "alloc") (param i32) (result i32) (i32.const 0))
        )
        "#,
        );

        let result = GuestModule::instantiate(&wasm, None);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Input.CallMouseDown not found")
        );
    }

    #[test]
    fn missing_memory_export_is_a_load_error() {
        let wasm = wat_to_wasm(
            r#"
        (module
            (func (export "Input.Reset"))
        )
        "#,
        );

        let result = GuestModule::instantiate(&wasm, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("does not export memory"));
    }

    #[test]
    fn update_draws_through_the_bridge() {
        let (handle, recording) = recording_surface();
        let wasm = wat_to_wasm(&drawing_guest_wat());
        let module =
            GuestModule::instantiate(&wasm, Some(handle)).expect("Failed to instantiate");

        module.call_update(0.016).expect("update");

        let commands = recording.lock().take_commands();
        assert_eq!(
            commands,
            vec![
                DrawCommand::FillStyle { style: "#1e90ff".to_string() },
                DrawCommand::BeginPath,
                DrawCommand::FillRect { x: 10.0, y: 20.0, width: 30.0, height: 40.0 },
            ]
        );
    }

    #[test]
    fn drawing_without_surface_is_a_silent_noop() {
        let wasm = wat_to_wasm(&drawing_guest_wat());
        let module = GuestModule::instantiate(&wasm, None).expect("Failed to instantiate");

        // Guest issues drawing calls during update; none may trap.
        module.call_update(0.016).expect("update");
    }

    #[test]
    fn init_assets_skips_guests_without_the_export() {
        let wasm = wat_to_wasm(&quiet_guest_wat());
        let module = GuestModule::instantiate(&wasm, None).expect("Failed to instantiate");

        module
            .init_assets(&["https://host/app.dll".to_string()])
            .expect("init should be skipped");
    }

    #[test]
    fn init_assets_hands_urls_to_init_aware_guests() {
        let wasm = wat_to_wasm(&init_aware_guest_wat());
        let module = GuestModule::instantiate(&wasm, None).expect("Failed to instantiate");

        module
            .init_assets(&["https://host/app.dll".to_string(), "https://host/app.pdb".to_string()])
            .expect("init");
    }
}
