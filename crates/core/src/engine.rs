//! The core `Engine` trait that every field integrator implements.
//!
//! The trait is object-safe so engines can be used as `dyn Engine` for runtime
//! switching between the reaction-diffusion and wave laws.

use crate::error::EngineError;
use crate::field::Field;
use serde_json::Value;

/// Core trait for stencil-based field integrators.
///
/// Each engine owns its double-buffered fields and parameters. One call to
/// [`Engine::step`] advances the simulation by one tick; the
/// [`TickDriver`](crate::driver::TickDriver) calls it a fixed number of times
/// per presented frame.
///
/// This trait is **object-safe**: you can use `Box<dyn Engine>` or `&dyn Engine`
/// for runtime polymorphism.
pub trait Engine {
    /// Advance the simulation by one tick.
    ///
    /// Numerical divergence is not an error: non-finite values are written
    /// into the field and the call still returns `Ok(())`.
    fn step(&mut self) -> Result<(), EngineError>;

    /// The primary presentation field (the "new" buffer of the main quantity).
    fn field(&self) -> &Field;

    /// Names of every presentable channel, index 0 being [`Engine::field`].
    fn channel_names(&self) -> &'static [&'static str];

    /// Read-only view of channel `index`, or `None` if out of range.
    fn channel(&self, index: usize) -> Option<&Field>;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all available parameters, their types and defaults.
    fn param_schema(&self) -> Value;

    /// Overwrites the parameters present in `params`; absent keys keep their
    /// current value. Rejects values that violate a precondition and leaves
    /// the engine untouched in that case.
    fn update_params(&mut self, params: &Value) -> Result<(), EngineError>;

    /// Resets every buffer to the engine's initial condition in place
    /// (random values, spots, masks), continuing its own PRNG sequence.
    fn reinitialize(&mut self);

    /// Simulated time elapsed since the last (re)initialisation.
    fn time(&self) -> f64;

    /// Resolves a channel by name.
    fn channel_by_name(&self, name: &str) -> Result<&Field, EngineError> {
        self.channel_names()
            .iter()
            .position(|&n| n == name)
            .and_then(|i| self.channel(i))
            .ok_or_else(|| EngineError::UnknownChannel(name.to_owned()))
    }
}
