#![deny(unsafe_code)]
//! Two-field reaction-diffusion engine producing Turing patterns.
//!
//! Two species A (activator) and B (inhibitor) react and diffuse on a
//! fixed W×H grid with insulated (collapse-to-self) edges:
//!
//! ```text
//! A' = A + dt·(Da·∇²A + A − A³ − B + α)
//! B' = B + dt·(Db·∇²B + β·(A − B))
//! ```
//!
//! Each field is double-buffered ("old" / "new"). Two update schemes are
//! supported, see [`UpdateScheme`]. The presentation field is the "new" A
//! buffer; channel 1 is the "new" B buffer.
//!
//! Integration is explicit Euler with no stability control: a time step that
//! is too large for the diffusion constants makes the fields diverge, and the
//! NaN/∞ values are left in place for the caller to see.

use fieldlab_core::error::EngineError;
use fieldlab_core::field::Field;
use fieldlab_core::params::{
    check_spacing, check_time_step, param_f64, param_i64, param_string,
};
use fieldlab_core::prng::Xorshift64;
use fieldlab_core::stencil::{laplacian_slice, Boundary};
use fieldlab_core::Engine;
use serde_json::{json, Value};
use tracing::info;

/// Default grid spacing.
const DEFAULT_DX: f64 = 1.0;
/// Default time step of the CPU (staggered) variant.
const DEFAULT_DT: f64 = 0.00005;
/// Time step of the compute-kernel (ping-pong) variant.
pub const PING_PONG_DT: f64 = 0.0005;
/// Default diffusion coefficient of A.
const DEFAULT_DIFFUSION_A: f64 = 1.0;
/// Default diffusion coefficient of B.
const DEFAULT_DIFFUSION_B: f64 = 100.0;
/// Default constant source term α in the A equation.
const DEFAULT_ALPHA: f64 = -0.005;
/// Default relaxation rate β of B towards A.
const DEFAULT_BETA: f64 = 10.0;
/// Default number of spots for [`TuringInit::Spots`].
pub const DEFAULT_SPOT_COUNT: usize = 100;
/// Default spot radius in cells.
pub const DEFAULT_SPOT_RADIUS: f64 = 10.0;
/// A concentration inside a seeded spot.
const SPOT_A: f64 = 0.5;
/// B concentration inside a seeded spot.
const SPOT_B: f64 = 0.25;

/// How one `step()` moves data between the old and new buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateScheme {
    /// Two half-steps per tick, `old ← f(new)` then `new ← f(old)`.
    ///
    /// The first half-step reads B's cross term from the old buffer as it
    /// was *before* this half-step overwrites it, and B's reaction reads the
    /// freshly written old A. The second half-step is a plain explicit
    /// update from the old buffers. This follows the CPU demo's loop order
    /// and read pattern exactly, in f64 storage rather than its f32 arrays;
    /// it is not a symmetric leapfrog.
    #[default]
    Staggered,
    /// One update per tick: the buffers swap roles, then `new ← f(old)`.
    /// B's reaction term reads the already-updated A of the same cell.
    PingPong,
}

impl UpdateScheme {
    /// Stable name used in JSON params.
    pub fn name(self) -> &'static str {
        match self {
            UpdateScheme::Staggered => "staggered",
            UpdateScheme::PingPong => "ping_pong",
        }
    }

    /// Parses a name produced by [`UpdateScheme::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "staggered" => Some(UpdateScheme::Staggered),
            "ping_pong" => Some(UpdateScheme::PingPong),
            _ => None,
        }
    }

    /// Half-steps of length `dt` performed by one tick.
    fn half_steps(self) -> f64 {
        match self {
            UpdateScheme::Staggered => 2.0,
            UpdateScheme::PingPong => 1.0,
        }
    }
}

/// Initial condition written on construction and on every re-initialisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TuringInit {
    /// A and B uniform in [0, 1), drawn per cell (A first, then B).
    Random,
    /// Every cell zero.
    Zero,
    /// All zero, then `count` discs of `radius` at random centres with
    /// A = 0.5 and B = 0.25.
    Spots { count: usize, radius: f64 },
}

impl TuringInit {
    /// Stable name used in JSON params.
    pub fn name(&self) -> &'static str {
        match self {
            TuringInit::Random => "random",
            TuringInit::Zero => "zero",
            TuringInit::Spots { .. } => "spots",
        }
    }

    /// Reads `init`, `spot_count` and `spot_radius`, falling back to `base`.
    ///
    /// A negative `spot_count` seeds no spots. Unknown `init` names are a
    /// parameter error.
    pub fn from_json(params: &Value, base: TuringInit) -> Result<Self, EngineError> {
        let (base_count, base_radius) = match base {
            TuringInit::Spots { count, radius } => (count, radius),
            _ => (DEFAULT_SPOT_COUNT, DEFAULT_SPOT_RADIUS),
        };
        let name = param_string(params, "init", base.name());
        match name.as_str() {
            "random" => Ok(TuringInit::Random),
            "zero" => Ok(TuringInit::Zero),
            "spots" => {
                let count = param_i64(params, "spot_count", base_count as i64).max(0) as usize;
                let radius = param_f64(params, "spot_radius", base_radius);
                Ok(TuringInit::Spots { count, radius })
            }
            other => Err(EngineError::invalid_param(
                "init",
                format!("unknown initial condition '{other}'"),
            )),
        }
    }
}

/// Simulation parameters. All values are read by every stencil evaluation
/// and may be changed between ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TuringParams {
    /// Grid spacing.
    pub dx: f64,
    /// Time step per half-step.
    pub dt: f64,
    /// Diffusion coefficient Da.
    pub diffusion_a: f64,
    /// Diffusion coefficient Db.
    pub diffusion_b: f64,
    /// Constant source term α.
    pub alpha: f64,
    /// Coupling rate β.
    pub beta: f64,
    /// Buffer update scheme.
    pub scheme: UpdateScheme,
}

impl Default for TuringParams {
    fn default() -> Self {
        Self {
            dx: DEFAULT_DX,
            dt: DEFAULT_DT,
            diffusion_a: DEFAULT_DIFFUSION_A,
            diffusion_b: DEFAULT_DIFFUSION_B,
            alpha: DEFAULT_ALPHA,
            beta: DEFAULT_BETA,
            scheme: UpdateScheme::Staggered,
        }
    }
}

impl TuringParams {
    /// Parameters of the compute-kernel demo: ping-pong buffers, dt = 0.0005.
    pub fn ping_pong() -> Self {
        Self {
            dt: PING_PONG_DT,
            scheme: UpdateScheme::PingPong,
            ..Self::default()
        }
    }

    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        Self::default().merged(params)
    }

    /// Returns a copy with every key present in `params` overwritten, then
    /// validates it.
    pub fn merged(&self, params: &Value) -> Result<Self, EngineError> {
        let scheme_name = param_string(params, "scheme", self.scheme.name());
        let scheme = UpdateScheme::from_name(&scheme_name).ok_or_else(|| {
            EngineError::invalid_param("scheme", format!("unknown scheme '{scheme_name}'"))
        })?;
        let merged = Self {
            dx: param_f64(params, "dx", self.dx),
            dt: param_f64(params, "dt", self.dt),
            diffusion_a: param_f64(params, "diffusion_a", self.diffusion_a),
            diffusion_b: param_f64(params, "diffusion_b", self.diffusion_b),
            alpha: param_f64(params, "alpha", self.alpha),
            beta: param_f64(params, "beta", self.beta),
            scheme,
        };
        merged.validate()?;
        Ok(merged)
    }

    /// `dx` must be finite and positive, `dt` finite and non-negative.
    /// Nothing else is range-checked.
    pub fn validate(&self) -> Result<(), EngineError> {
        check_spacing("dx", self.dx)?;
        check_time_step("dt", self.dt)
    }
}

/// Reaction-diffusion engine with double-buffered A and B fields.
pub struct TuringPatterns {
    new_a: Field,
    new_b: Field,
    old_a: Field,
    old_b: Field,
    params: TuringParams,
    init: TuringInit,
    rng: Xorshift64,
    time: f64,
}

impl TuringPatterns {
    /// Allocates the four buffers and writes the initial condition.
    ///
    /// Returns `EngineError::InvalidDimensions` if width or height is zero,
    /// or `EngineError::InvalidParameter` if `params` fails validation.
    pub fn new(
        width: usize,
        height: usize,
        seed: u64,
        params: TuringParams,
        init: TuringInit,
    ) -> Result<Self, EngineError> {
        params.validate()?;
        let mut engine = Self {
            new_a: Field::new(width, height)?,
            new_b: Field::new(width, height)?,
            old_a: Field::new(width, height)?,
            old_b: Field::new(width, height)?,
            params,
            init,
            rng: Xorshift64::new(seed),
            time: 0.0,
        };
        engine.write_initial_condition();
        info!(
            width,
            height,
            seed,
            scheme = params.scheme.name(),
            init = init.name(),
            "turing engine created"
        );
        Ok(engine)
    }

    /// Creates an engine from a JSON params object.
    ///
    /// Reads `dx`, `dt`, `diffusion_a`, `diffusion_b`, `alpha`, `beta`,
    /// `scheme`, `init`, `spot_count` and `spot_radius`; missing keys take
    /// the CPU demo defaults (staggered scheme, random init).
    pub fn from_json(
        width: usize,
        height: usize,
        seed: u64,
        json_params: &Value,
    ) -> Result<Self, EngineError> {
        Self::from_json_with_base(
            width,
            height,
            seed,
            json_params,
            TuringParams::default(),
            TuringInit::Random,
        )
    }

    /// Like [`TuringPatterns::from_json`], with caller-chosen defaults for
    /// keys missing from `json_params`.
    pub fn from_json_with_base(
        width: usize,
        height: usize,
        seed: u64,
        json_params: &Value,
        base_params: TuringParams,
        base_init: TuringInit,
    ) -> Result<Self, EngineError> {
        let params = base_params.merged(json_params)?;
        let init = TuringInit::from_json(json_params, base_init)?;
        Self::new(width, height, seed, params, init)
    }

    /// Current parameters.
    pub fn turing_params(&self) -> TuringParams {
        self.params
    }

    /// Current initial condition.
    pub fn init(&self) -> TuringInit {
        self.init
    }

    /// Presentation buffer of A.
    pub fn a_field(&self) -> &Field {
        &self.new_a
    }

    /// Presentation buffer of B.
    pub fn b_field(&self) -> &Field {
        &self.new_b
    }

    /// Mutable presentation buffers `(A, B)`, for painting custom initial
    /// conditions in place.
    pub fn fields_mut(&mut self) -> (&mut Field, &mut Field) {
        (&mut self.new_a, &mut self.new_b)
    }

    /// The old buffers `(A, B)`: scratch space of the last tick.
    pub fn old_fields(&self) -> (&Field, &Field) {
        (&self.old_a, &self.old_b)
    }

    fn write_initial_condition(&mut self) {
        let w = self.new_a.width();
        let h = self.new_a.height();
        match self.init {
            TuringInit::Random => {
                let (a, b, rng) = (&mut self.new_a, &mut self.new_b, &mut self.rng);
                for (ca, cb) in a.data_mut().iter_mut().zip(b.data_mut().iter_mut()) {
                    *ca = rng.next_f64();
                    *cb = rng.next_f64();
                }
            }
            TuringInit::Zero => {
                self.new_a.fill(0.0);
                self.new_b.fill(0.0);
            }
            TuringInit::Spots { count, radius } => {
                self.new_a.fill(0.0);
                self.new_b.fill(0.0);
                for _ in 0..count {
                    let (cx, cy) = self.rng.next_point(w, h);
                    for idx in self.new_a.disc_indices(cx, cy, radius) {
                        self.new_a.data_mut()[idx] = SPOT_A;
                        self.new_b.data_mut()[idx] = SPOT_B;
                    }
                }
            }
        }
        // The CPU demo's old buffers start zeroed and its first half-step
        // reads old B; the ping-pong variant uploads the same data to both.
        match self.params.scheme {
            UpdateScheme::Staggered => {
                self.old_a.fill(0.0);
                self.old_b.fill(0.0);
            }
            UpdateScheme::PingPong => {
                self.old_a.data_mut().copy_from_slice(self.new_a.data());
                self.old_b.data_mut().copy_from_slice(self.new_b.data());
            }
        }
        self.time = 0.0;
    }
}

impl Engine for TuringPatterns {
    fn step(&mut self) -> Result<(), EngineError> {
        let w = self.new_a.width();
        let h = self.new_a.height();
        let p = self.params;

        match p.scheme {
            UpdateScheme::Staggered => {
                stale_coupled_pass(
                    self.new_a.data(),
                    self.new_b.data(),
                    self.old_a.data_mut(),
                    self.old_b.data_mut(),
                    w,
                    h,
                    &p,
                );
                explicit_pass(
                    self.old_a.data(),
                    self.old_b.data(),
                    self.new_a.data_mut(),
                    self.new_b.data_mut(),
                    w,
                    h,
                    &p,
                );
            }
            UpdateScheme::PingPong => {
                std::mem::swap(&mut self.old_a, &mut self.new_a);
                std::mem::swap(&mut self.old_b, &mut self.new_b);
                kernel_pass(
                    self.old_a.data(),
                    self.old_b.data(),
                    self.new_a.data_mut(),
                    self.new_b.data_mut(),
                    w,
                    h,
                    &p,
                );
            }
        }

        self.time += p.scheme.half_steps() * p.dt;
        Ok(())
    }

    fn field(&self) -> &Field {
        &self.new_a
    }

    fn channel_names(&self) -> &'static [&'static str] {
        &["a", "b"]
    }

    fn channel(&self, index: usize) -> Option<&Field> {
        match index {
            0 => Some(&self.new_a),
            1 => Some(&self.new_b),
            _ => None,
        }
    }

    fn params(&self) -> Value {
        let mut v = json!({
            "dx": self.params.dx,
            "dt": self.params.dt,
            "diffusion_a": self.params.diffusion_a,
            "diffusion_b": self.params.diffusion_b,
            "alpha": self.params.alpha,
            "beta": self.params.beta,
            "scheme": self.params.scheme.name(),
            "init": self.init.name(),
        });
        if let TuringInit::Spots { count, radius } = self.init {
            v["spot_count"] = json!(count);
            v["spot_radius"] = json!(radius);
        }
        v
    }

    fn param_schema(&self) -> Value {
        json!({
            "dx": {
                "type": "number",
                "default": DEFAULT_DX,
                "min": 0.0,
                "exclusive_min": true,
                "description": "Grid spacing"
            },
            "dt": {
                "type": "number",
                "default": DEFAULT_DT,
                "min": 0.0,
                "description": "Time step per half-step (no stability check is applied)"
            },
            "diffusion_a": {
                "type": "number",
                "default": DEFAULT_DIFFUSION_A,
                "description": "Diffusion coefficient of A"
            },
            "diffusion_b": {
                "type": "number",
                "default": DEFAULT_DIFFUSION_B,
                "description": "Diffusion coefficient of B"
            },
            "alpha": {
                "type": "number",
                "default": DEFAULT_ALPHA,
                "description": "Constant source term in the A equation"
            },
            "beta": {
                "type": "number",
                "default": DEFAULT_BETA,
                "description": "Rate at which B relaxes towards A"
            },
            "scheme": {
                "type": "string",
                "default": UpdateScheme::Staggered.name(),
                "enum": ["staggered", "ping_pong"],
                "description": "Buffer update scheme"
            },
            "init": {
                "type": "string",
                "default": TuringInit::Random.name(),
                "enum": ["random", "zero", "spots"],
                "description": "Initial condition written on reset"
            },
            "spot_count": {
                "type": "integer",
                "default": DEFAULT_SPOT_COUNT,
                "min": 0,
                "description": "Number of spots for init = spots"
            },
            "spot_radius": {
                "type": "number",
                "default": DEFAULT_SPOT_RADIUS,
                "description": "Spot radius in cells for init = spots"
            }
        })
    }

    fn update_params(&mut self, params: &Value) -> Result<(), EngineError> {
        let merged = self.params.merged(params)?;
        let init = TuringInit::from_json(params, self.init)?;
        self.params = merged;
        self.init = init;
        Ok(())
    }

    fn reinitialize(&mut self) {
        self.write_initial_condition();
        info!(init = self.init.name(), "turing fields re-initialised");
    }

    fn time(&self) -> f64 {
        self.time
    }
}

/// First half-step of the staggered scheme: `old ← f(new)`.
///
/// A's cross term reads `old_b` before this pass overwrites the cell; B's
/// reaction term reads the `old_a` value written just above.
fn stale_coupled_pass(
    new_a: &[f64],
    new_b: &[f64],
    old_a: &mut [f64],
    old_b: &mut [f64],
    w: usize,
    h: usize,
    p: &TuringParams,
) {
    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;

            let a = new_a[idx];
            let lap = laplacian_slice(new_a, w, h, x, y, p.dx, Boundary::Reflect);
            old_a[idx] = a + p.dt * (p.diffusion_a * lap + a - a * a * a - old_b[idx] + p.alpha);

            let b = new_b[idx];
            let lap = laplacian_slice(new_b, w, h, x, y, p.dx, Boundary::Reflect);
            old_b[idx] = b + p.dt * (p.diffusion_b * lap + p.beta * (old_a[idx] - b));
        }
    }
}

/// Second half-step of the staggered scheme: `new ← f(old)`, plain explicit Euler.
fn explicit_pass(
    old_a: &[f64],
    old_b: &[f64],
    new_a: &mut [f64],
    new_b: &mut [f64],
    w: usize,
    h: usize,
    p: &TuringParams,
) {
    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            let a = old_a[idx];
            let b = old_b[idx];

            let lap = laplacian_slice(old_a, w, h, x, y, p.dx, Boundary::Reflect);
            new_a[idx] = a + p.dt * (p.diffusion_a * lap + a - a * a * a - b + p.alpha);

            let lap = laplacian_slice(old_b, w, h, x, y, p.dx, Boundary::Reflect);
            new_b[idx] = b + p.dt * (p.diffusion_b * lap + p.beta * (a - b));
        }
    }
}

/// Single update of the ping-pong scheme. B's reaction uses the updated A.
fn kernel_pass(
    old_a: &[f64],
    old_b: &[f64],
    new_a: &mut [f64],
    new_b: &mut [f64],
    w: usize,
    h: usize,
    p: &TuringParams,
) {
    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            let a = old_a[idx];
            let b = old_b[idx];
            let lap_a = laplacian_slice(old_a, w, h, x, y, p.dx, Boundary::Reflect);
            let lap_b = laplacian_slice(old_b, w, h, x, y, p.dx, Boundary::Reflect);

            let a_next = a + p.dt * (p.diffusion_a * lap_a + reaction_a(a, b, p.alpha));
            new_a[idx] = a_next;
            new_b[idx] = b + p.dt * (p.diffusion_b * lap_b + p.beta * (a_next - b));
        }
    }
}

#[inline]
fn reaction_a(a: f64, b: f64, alpha: f64) -> f64 {
    a - a * a * a - b + alpha
}
