//! Orchestration hook
//!
//! A [`ComponentScope`] stands for one mounted page component. Choreographies
//! register callbacks with [`ComponentScope::use_orchestration`]; the scope
//! runs them on [`commit`](ComponentScope::commit) (after the component's
//! elements exist), again when their dependencies change, and invokes the
//! cleanups they return before re-running and on unmount.
//!
//! ```rust
//! use kinetic_animation::{AnimationEngine, TweenVars};
//! use kinetic_choreo::{ChoreoConfig, ChoreoContext, ComponentScope, OrchestrationOptions};
//! use kinetic_core::{Surface, Viewport};
//!
//! let surface = Surface::new(Viewport::new(1280.0, 800.0));
//! let engine = AnimationEngine::new(surface.clone());
//! let ctx = ChoreoContext::new(engine.handle(), ChoreoConfig::default()).unwrap();
//! let scope = ComponentScope::new(ctx);
//!
//! let title = surface.create_element("h1", None);
//! scope.use_orchestration(
//!     move |ctx| {
//!         let handle = ctx.engine.from(&[title], TweenVars::opacity(0.0), 1.0)?;
//!         Ok(Some(Box::new(move || {
//!             handle.kill();
//!         })))
//!     },
//!     OrchestrationOptions::default(),
//! );
//! scope.commit().unwrap();
//! assert_eq!(engine.animation_count(), 1);
//!
//! scope.unmount();
//! assert_eq!(engine.animation_count(), 0);
//! ```

use std::cell::RefCell;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use kinetic_animation::{AnimationError, EngineHandle, Presets};
use kinetic_core::Surface;
use rustc_hash::FxHasher;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::config::ChoreoConfig;
use crate::error::Result;
use crate::utils::AnimationUtils;

new_key_type! {
    /// Handle to one registered choreography callback
    pub struct RegistrationId;
}

/// Routine returned by a choreography to undo its persistent bindings
pub type Cleanup = Box<dyn FnOnce()>;

type ChoreoFn = Box<dyn FnMut(&ChoreoContext) -> Result<Option<Cleanup>>>;

/// Where the owning component is being rendered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecutionEnv {
    #[default]
    Browser,
    /// No document: every registration is a no-op
    Server,
}

// ============================================================================
// Context
// ============================================================================

/// Everything a choreography callback may use
#[derive(Clone)]
pub struct ChoreoContext {
    pub engine: EngineHandle,
    pub surface: Surface,
    pub utils: AnimationUtils,
    pub presets: Presets,
    pub config: Rc<ChoreoConfig>,
}

impl ChoreoContext {
    /// Fails on an invalid config or a dropped engine
    pub fn new(engine: EngineHandle, config: ChoreoConfig) -> Result<Self> {
        config.validate()?;
        let surface = engine.surface().ok_or(AnimationError::EngineDropped)?;
        let config = Rc::new(config);
        Ok(Self {
            utils: AnimationUtils::new(engine.clone(), surface.clone(), Rc::clone(&config)),
            engine,
            surface,
            presets: Presets::default(),
            config,
        })
    }
}

// ============================================================================
// Options
// ============================================================================

/// Dependency values are compared through their hashes
pub type DependencyKey = u64;

pub fn dependency_key<T: Hash + ?Sized>(value: &T) -> DependencyKey {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrchestrationOptions {
    /// Re-run when any of these change; empty runs once per mount
    pub dependencies: SmallVec<[DependencyKey; 4]>,
    /// Invoke the previous cleanup before re-running and on unmount
    pub revert: bool,
}

impl Default for OrchestrationOptions {
    fn default() -> Self {
        Self {
            dependencies: SmallVec::new(),
            revert: true,
        }
    }
}

impl OrchestrationOptions {
    pub fn dependency<T: Hash + ?Sized>(mut self, value: &T) -> Self {
        self.dependencies.push(dependency_key(value));
        self
    }

    pub fn revert(mut self, revert: bool) -> Self {
        self.revert = revert;
        self
    }
}

// ============================================================================
// Scope
// ============================================================================

struct Registration {
    /// Taken out while the callback runs
    callback: Option<ChoreoFn>,
    options: OrchestrationOptions,
    pending: bool,
    cleanup: Option<Cleanup>,
}

struct ScopeInner {
    env: ExecutionEnv,
    context: ChoreoContext,
    registrations: SlotMap<RegistrationId, Registration>,
    mounted: bool,
}

impl ScopeInner {
    fn take_cleanups(&mut self) -> Vec<Cleanup> {
        self.registrations
            .values_mut()
            .filter(|r| r.options.revert)
            .filter_map(|r| r.cleanup.take())
            .collect()
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        let cleanups = self.take_cleanups();
        if !cleanups.is_empty() {
            tracing::debug!("scope: dropped with {} live cleanup(s)", cleanups.len());
        }
        for cleanup in cleanups {
            cleanup();
        }
    }
}

/// One mounted component instance
#[derive(Clone)]
pub struct ComponentScope {
    inner: Rc<RefCell<ScopeInner>>,
}

/// Non-owning scope handle, for registering from inside animation callbacks
#[derive(Clone)]
pub struct WeakScope {
    inner: Weak<RefCell<ScopeInner>>,
}

impl WeakScope {
    pub fn upgrade(&self) -> Option<ComponentScope> {
        self.inner.upgrade().map(|inner| ComponentScope { inner })
    }
}

impl ComponentScope {
    pub fn new(context: ChoreoContext) -> Self {
        Self::with_env(context, ExecutionEnv::Browser)
    }

    pub fn with_env(context: ChoreoContext, env: ExecutionEnv) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ScopeInner {
                env,
                context,
                registrations: SlotMap::with_key(),
                mounted: true,
            })),
        }
    }

    pub fn downgrade(&self) -> WeakScope {
        WeakScope {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn context(&self) -> ChoreoContext {
        self.inner.borrow().context.clone()
    }

    pub fn env(&self) -> ExecutionEnv {
        self.inner.borrow().env
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.borrow().mounted
    }

    pub fn registration_count(&self) -> usize {
        self.inner.borrow().registrations.len()
    }

    /// Register a choreography; it first runs on the next [`commit`](Self::commit)
    pub fn use_orchestration<F>(&self, callback: F, options: OrchestrationOptions) -> RegistrationId
    where
        F: FnMut(&ChoreoContext) -> Result<Option<Cleanup>> + 'static,
    {
        let id = self.inner.borrow_mut().registrations.insert(Registration {
            callback: Some(Box::new(callback)),
            options,
            pending: true,
            cleanup: None,
        });
        tracing::trace!("scope: registered {:?}", id);
        id
    }

    /// Replace a registration's dependencies; it re-runs on the next commit if they changed
    pub fn set_dependencies(&self, id: RegistrationId, dependencies: &[DependencyKey]) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(registration) = inner.registrations.get_mut(id) else {
            return false;
        };
        if registration.options.dependencies.as_slice() == dependencies {
            return false;
        }
        registration.options.dependencies = SmallVec::from_slice(dependencies);
        registration.pending = true;
        true
    }

    /// Run every pending registration
    ///
    /// Errors returned by a callback propagate unchanged; the remaining
    /// registrations stay pending.
    pub fn commit(&self) -> Result<()> {
        {
            let inner = self.inner.borrow();
            if inner.env == ExecutionEnv::Server || !inner.mounted {
                return Ok(());
            }
        }

        // Registrations may be added while callbacks run
        loop {
            let next = {
                let inner = self.inner.borrow();
                inner
                    .registrations
                    .iter()
                    .find(|(_, r)| r.pending && r.callback.is_some())
                    .map(|(id, _)| id)
            };
            let Some(id) = next else {
                return Ok(());
            };
            self.run(id)?;
        }
    }

    fn run(&self, id: RegistrationId) -> Result<()> {
        let (mut callback, previous, context) = {
            let mut inner = self.inner.borrow_mut();
            let context = inner.context.clone();
            let Some(registration) = inner.registrations.get_mut(id) else {
                return Ok(());
            };
            registration.pending = false;
            let previous = registration.cleanup.take();
            let previous = if registration.options.revert {
                previous
            } else {
                None
            };
            match registration.callback.take() {
                Some(callback) => (callback, previous, context),
                None => return Ok(()),
            }
        };

        if let Some(cleanup) = previous {
            tracing::debug!("scope: reverting {:?} before re-run", id);
            cleanup();
        }

        tracing::debug!("scope: running {:?}", id);
        let result = callback(&context);

        let mut inner = self.inner.borrow_mut();
        let Some(registration) = inner.registrations.get_mut(id) else {
            // Unregistered while running: nothing left to own the cleanup
            drop(inner);
            if let Ok(Some(cleanup)) = result {
                cleanup();
            }
            return Ok(());
        };
        registration.callback = Some(callback);
        match result {
            Ok(cleanup) => {
                registration.cleanup = cleanup;
                Ok(())
            }
            Err(err) => {
                tracing::warn!("scope: {:?} failed: {}", id, err);
                Err(err)
            }
        }
    }

    /// Invoke every outstanding cleanup and drop the registrations
    pub fn unmount(&self) {
        let (cleanups, registrations) = {
            let mut inner = self.inner.borrow_mut();
            if !inner.mounted {
                return;
            }
            inner.mounted = false;
            let cleanups = inner.take_cleanups();
            let registrations = std::mem::take(&mut inner.registrations);
            (cleanups, registrations)
        };
        tracing::debug!("scope: unmounting, {} cleanup(s)", cleanups.len());
        for cleanup in cleanups {
            cleanup();
        }
        // Callbacks may capture scope handles; drop them outside the borrow
        drop(registrations);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChoreoError;
    use kinetic_animation::AnimationEngine;
    use kinetic_core::{ElementId, Viewport};
    use std::cell::Cell;

    fn scope_with(env: ExecutionEnv) -> (AnimationEngine, ComponentScope) {
        let surface = Surface::new(Viewport::new(1280.0, 800.0));
        let engine = AnimationEngine::new(surface);
        let ctx = ChoreoContext::new(engine.handle(), ChoreoConfig::default()).unwrap();
        (engine, ComponentScope::with_env(ctx, env))
    }

    fn counting(runs: &Rc<Cell<u32>>, cleanups: &Rc<Cell<u32>>) -> impl FnMut(&ChoreoContext) -> Result<Option<Cleanup>> {
        let runs = runs.clone();
        let cleanups = cleanups.clone();
        move |_| {
            runs.set(runs.get() + 1);
            let cleanups = cleanups.clone();
            Ok(Some(Box::new(move || cleanups.set(cleanups.get() + 1))))
        }
    }

    #[test]
    fn test_runs_once_without_dependencies() {
        let (_engine, scope) = scope_with(ExecutionEnv::Browser);
        let runs = Rc::new(Cell::new(0));
        let cleanups = Rc::new(Cell::new(0));
        scope.use_orchestration(counting(&runs, &cleanups), OrchestrationOptions::default());

        assert_eq!(runs.get(), 0);
        scope.commit().unwrap();
        scope.commit().unwrap();
        assert_eq!(runs.get(), 1);

        scope.unmount();
        assert_eq!(cleanups.get(), 1);
        assert!(!scope.is_mounted());
        scope.commit().unwrap();
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_dependency_change_reverts_then_reruns() {
        let (_engine, scope) = scope_with(ExecutionEnv::Browser);
        let runs = Rc::new(Cell::new(0));
        let cleanups = Rc::new(Cell::new(0));
        let id = scope.use_orchestration(
            counting(&runs, &cleanups),
            OrchestrationOptions::default().dependency("mobile"),
        );
        scope.commit().unwrap();

        assert!(!scope.set_dependencies(id, &[dependency_key("mobile")]));
        scope.commit().unwrap();
        assert_eq!(runs.get(), 1);

        assert!(scope.set_dependencies(id, &[dependency_key("desktop")]));
        scope.commit().unwrap();
        assert_eq!(runs.get(), 2);
        assert_eq!(cleanups.get(), 1);
    }

    #[test]
    fn test_revert_false_skips_cleanup() {
        let (_engine, scope) = scope_with(ExecutionEnv::Browser);
        let runs = Rc::new(Cell::new(0));
        let cleanups = Rc::new(Cell::new(0));
        let id = scope.use_orchestration(
            counting(&runs, &cleanups),
            OrchestrationOptions::default().dependency(&1).revert(false),
        );
        scope.commit().unwrap();
        scope.set_dependencies(id, &[dependency_key(&2)]);
        scope.commit().unwrap();
        scope.unmount();
        assert_eq!(runs.get(), 2);
        assert_eq!(cleanups.get(), 0);
    }

    #[test]
    fn test_server_env_never_runs() {
        let (_engine, scope) = scope_with(ExecutionEnv::Server);
        let runs = Rc::new(Cell::new(0));
        let cleanups = Rc::new(Cell::new(0));
        scope.use_orchestration(counting(&runs, &cleanups), OrchestrationOptions::default());
        scope.commit().unwrap();
        scope.unmount();
        assert_eq!(runs.get(), 0);
        assert_eq!(cleanups.get(), 0);
    }

    #[test]
    fn test_errors_propagate() {
        let (_engine, scope) = scope_with(ExecutionEnv::Browser);
        let missing = ElementId::default();
        scope.use_orchestration(
            move |_| Err(ChoreoError::AlreadyBound(missing)),
            OrchestrationOptions::default(),
        );
        assert_eq!(scope.commit(), Err(ChoreoError::AlreadyBound(missing)));
    }

    #[test]
    fn test_register_from_inside_callback() {
        let (_engine, scope) = scope_with(ExecutionEnv::Browser);
        let runs = Rc::new(Cell::new(0));
        let cleanups = Rc::new(Cell::new(0));
        let weak = scope.downgrade();
        let (r, c) = (runs.clone(), cleanups.clone());
        scope.use_orchestration(
            move |_| {
                if let Some(scope) = weak.upgrade() {
                    scope.use_orchestration(counting(&r, &c), OrchestrationOptions::default());
                }
                Ok(None)
            },
            OrchestrationOptions::default(),
        );
        scope.commit().unwrap();
        assert_eq!(runs.get(), 1);
        assert_eq!(scope.registration_count(), 2);

        drop(scope);
        assert_eq!(cleanups.get(), 1);
    }

    #[test]
    fn test_context_rejects_invalid_config() {
        let surface = Surface::new(Viewport::new(1280.0, 800.0));
        let engine = AnimationEngine::new(surface);
        let mut config = ChoreoConfig::default();
        config.intro.time_scale = 0.0;
        assert!(matches!(
            ChoreoContext::new(engine.handle(), config),
            Err(ChoreoError::Config(_))
        ));
    }
}
