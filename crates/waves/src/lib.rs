#![deny(unsafe_code)]
//! Wave-equation engine on a four-channel world.
//!
//! Each cell carries `u` (displacement), `v` (du/dt), `f` (forcing) and
//! `mask` (barrier / attenuation). One tick reads the previous world and
//! writes the next:
//!
//! ```text
//! v' = v + dt·(c²·∇²u − f)
//! u' = u + dt·v'
//! f' = Σ sources(x, y, t)
//! mask' = mask,   u' ← (1 − clamp(mask, 0, 1))·u'  where mask > 0
//! ```
//!
//! A mask of 1 pins `u` to zero; fractional masks act as a sponge.

mod setup;

pub use setup::{Barrier, Source, WaveInit, WaveSetup};

use fieldlab_core::error::EngineError;
use fieldlab_core::field::Field;
use fieldlab_core::params::{check_spacing, check_time_step, param_f64, param_string};
use fieldlab_core::prng::Xorshift64;
use fieldlab_core::stencil::{laplacian_slice, Boundary};
use fieldlab_core::Engine;
use serde_json::{json, Value};
use tracing::info;

/// Default grid spacing.
const DEFAULT_DX: f64 = 1.0;
/// Default time step.
const DEFAULT_DT: f64 = 0.0005;
/// Default wave speed.
const DEFAULT_C: f64 = 100.0;
/// Tick length over which a fractional mask `m` removes the fraction `m`
/// of `u`; other step sizes attenuate by `(1 − m)^(dt / SPONGE_DT)`.
const SPONGE_DT: f64 = DEFAULT_DT;

/// Numeric parameters of the wave law.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveParams {
    pub dx: f64,
    pub dt: f64,
    /// Wave speed.
    pub c: f64,
    /// Edge rule for the Laplacian of `u`.
    pub boundary: Boundary,
    /// Oscillating sources summed into `f` every tick.
    pub sources: Vec<Source>,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            dx: DEFAULT_DX,
            dt: DEFAULT_DT,
            c: DEFAULT_C,
            boundary: Boundary::Reflect,
            sources: Vec::new(),
        }
    }
}

impl WaveParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        Self::default().merged(params)
    }

    /// Returns a copy with every key present in `params` overwritten, then
    /// validates it. A `sources` array replaces the whole list.
    pub fn merged(&self, params: &Value) -> Result<Self, EngineError> {
        let boundary_name = param_string(params, "boundary", self.boundary.name());
        let boundary = Boundary::from_name(&boundary_name).ok_or_else(|| {
            EngineError::invalid_param("boundary", format!("unknown boundary '{boundary_name}'"))
        })?;
        let sources = match params.get("sources") {
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| EngineError::invalid_param("sources", e.to_string()))?,
            None => self.sources.clone(),
        };
        let merged = Self {
            dx: param_f64(params, "dx", self.dx),
            dt: param_f64(params, "dt", self.dt),
            c: param_f64(params, "c", self.c),
            boundary,
            sources,
        };
        merged.validate()?;
        Ok(merged)
    }

    /// `dx` finite and positive, `dt` finite and non-negative, every source
    /// `sigma` finite and positive.
    pub fn validate(&self) -> Result<(), EngineError> {
        check_spacing("dx", self.dx)?;
        check_time_step("dt", self.dt)?;
        self.sources.iter().try_for_each(Source::validate)
    }
}

/// One full set of the four channels.
struct World {
    u: Field,
    v: Field,
    f: Field,
    mask: Field,
}

impl World {
    fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        Ok(Self {
            u: Field::new(width, height)?,
            v: Field::new(width, height)?,
            f: Field::new(width, height)?,
            mask: Field::new(width, height)?,
        })
    }

    fn clear(&mut self) {
        self.u.fill(0.0);
        self.v.fill(0.0);
        self.f.fill(0.0);
        self.mask.fill(0.0);
    }

    /// Both worlds of an engine share one shape.
    fn copy_from(&mut self, other: &World) {
        self.u.data_mut().copy_from_slice(other.u.data());
        self.v.data_mut().copy_from_slice(other.v.data());
        self.f.data_mut().copy_from_slice(other.f.data());
        self.mask.data_mut().copy_from_slice(other.mask.data());
    }

    fn channel(&self, index: usize) -> Option<&Field> {
        match index {
            0 => Some(&self.u),
            1 => Some(&self.v),
            2 => Some(&self.f),
            3 => Some(&self.mask),
            _ => None,
        }
    }

    fn paint_barrier(&mut self, barrier: &Barrier) {
        let (w, h) = (self.u.width(), self.u.height());
        let value = barrier.mask_value();
        for (xs, ys) in barrier.rects(w, h) {
            self.u.paint_rect(xs.clone(), ys.clone(), 0.0);
            self.v.paint_rect(xs.clone(), ys.clone(), 0.0);
            self.f.paint_rect(xs.clone(), ys.clone(), 0.0);
            self.mask.paint_rect(xs, ys, value);
        }
    }
}

/// Wave engine with a double-buffered four-channel world.
pub struct Waves {
    current: World,
    previous: World,
    params: WaveParams,
    setup: WaveSetup,
    rng: Xorshift64,
    time: f64,
}

impl Waves {
    /// Allocates both worlds and applies `setup`.
    pub fn new(
        width: usize,
        height: usize,
        seed: u64,
        params: WaveParams,
        setup: WaveSetup,
    ) -> Result<Self, EngineError> {
        params.validate()?;
        let mut engine = Self {
            current: World::new(width, height)?,
            previous: World::new(width, height)?,
            params,
            setup,
            rng: Xorshift64::new(seed),
            time: 0.0,
        };
        engine.apply_setup();
        info!(
            width,
            height,
            seed,
            boundary = engine.params.boundary.name(),
            sources = engine.params.sources.len(),
            barriers = engine.setup.barriers.len(),
            init = engine.setup.init.name(),
            "wave engine created"
        );
        Ok(engine)
    }

    /// Creates an engine from JSON params with default numeric params and a
    /// zero world.
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
            WaveParams::default(),
            WaveSetup::default(),
        )
    }

    /// Like [`Waves::from_json`], with caller-chosen defaults for missing keys.
    ///
    /// Reads `dx`, `dt`, `c`, `boundary`, `sources`, `init` and `barriers`.
    pub fn from_json_with_base(
        width: usize,
        height: usize,
        seed: u64,
        json_params: &Value,
        base_params: WaveParams,
        base_setup: WaveSetup,
    ) -> Result<Self, EngineError> {
        let params = base_params.merged(json_params)?;
        let setup = merge_setup(&base_setup, json_params)?;
        Self::new(width, height, seed, params, setup)
    }

    pub fn wave_params(&self) -> &WaveParams {
        &self.params
    }

    pub fn setup(&self) -> &WaveSetup {
        &self.setup
    }

    /// Displacement.
    pub fn u(&self) -> &Field {
        &self.current.u
    }

    /// Velocity du/dt.
    pub fn v(&self) -> &Field {
        &self.current.v
    }

    /// Forcing.
    pub fn forcing(&self) -> &Field {
        &self.current.f
    }

    /// Barrier / attenuation mask.
    pub fn mask(&self) -> &Field {
        &self.current.mask
    }

    /// Mutable `(u, v, f, mask)` of the world the next tick reads from.
    pub fn channels_mut(&mut self) -> (&mut Field, &mut Field, &mut Field, &mut Field) {
        let w = &mut self.current;
        (&mut w.u, &mut w.v, &mut w.f, &mut w.mask)
    }

    fn apply_setup(&mut self) {
        let world = &mut self.current;
        world.clear();
        match self.setup.init {
            WaveInit::Zero => {}
            WaveInit::Random => {
                let rng = &mut self.rng;
                world.u.fill_with(|_, _| rng.next_f64());
            }
            WaveInit::Spot { x, y, radius } => {
                world.u.paint_disc(x, y, radius, 1.0);
            }
        }
        for barrier in &self.setup.barriers {
            world.paint_barrier(barrier);
        }
        if !self.params.sources.is_empty() {
            let (sources, dx) = (&self.params.sources, self.params.dx);
            world
                .f
                .fill_with(|x, y| sources.iter().fold(0.0, |acc, s| acc + s.forcing(x, y, dx, 0.0)));
        }
        self.previous.copy_from(&self.current);
        self.time = 0.0;
    }
}

/// Overlays `init` and `barriers` from `params` onto `base`.
///
/// `init` may be a name (`"zero"`, `"random"`) or a tagged object such as
/// `{"kind": "spot", "x": 10, "y": 10, "radius": 4}`.
fn merge_setup(base: &WaveSetup, params: &Value) -> Result<WaveSetup, EngineError> {
    let init = match params.get("init") {
        None => base.init,
        Some(Value::String(name)) => match name.as_str() {
            "zero" => WaveInit::Zero,
            "random" => WaveInit::Random,
            "spot" => {
                return Err(EngineError::invalid_param(
                    "init",
                    "spot needs an object with x, y and radius",
                ))
            }
            other => {
                return Err(EngineError::invalid_param(
                    "init",
                    format!("unknown initial condition '{other}'"),
                ))
            }
        },
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| EngineError::invalid_param("init", e.to_string()))?,
    };
    let barriers = match params.get("barriers") {
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|e| EngineError::invalid_param("barriers", e.to_string()))?,
        None => base.barriers.clone(),
    };
    Ok(WaveSetup { init, barriers })
}

impl Engine for Waves {
    fn step(&mut self) -> Result<(), EngineError> {
        std::mem::swap(&mut self.current, &mut self.previous);

        let w = self.current.u.width();
        let h = self.current.u.height();
        let WaveParams {
            dx,
            dt,
            c,
            boundary,
            ref sources,
        } = self.params;
        let c2 = c * c;
        let t = self.time;

        let prev = &self.previous;
        let (u0, v0, f0, m0) = (prev.u.data(), prev.v.data(), prev.f.data(), prev.mask.data());
        let next = &mut self.current;

        for y in 0..h {
            for x in 0..w {
                let idx = y * w + x;
                let lu = laplacian_slice(u0, w, h, x, y, dx, boundary);
                let v_next = v0[idx] + dt * (c2 * lu - f0[idx]);
                let mut u_next = u0[idx] + dt * v_next;
                let f_next = sources
                    .iter()
                    .fold(0.0, |acc, s| acc + s.forcing(x, y, dx, t));

                let m = m0[idx];
                if m >= 1.0 {
                    u_next = 0.0;
                } else if m > 0.0 {
                    u_next *= (1.0 - m).powf(dt / SPONGE_DT);
                }

                next.u.data_mut()[idx] = u_next;
                next.v.data_mut()[idx] = v_next;
                next.f.data_mut()[idx] = f_next;
                next.mask.data_mut()[idx] = m;
            }
        }

        self.time += dt;
        Ok(())
    }

    fn field(&self) -> &Field {
        &self.current.u
    }

    fn channel_names(&self) -> &'static [&'static str] {
        &["u", "v", "f", "mask"]
    }

    fn channel(&self, index: usize) -> Option<&Field> {
        self.current.channel(index)
    }

    fn params(&self) -> Value {
        json!({
            "dx": self.params.dx,
            "dt": self.params.dt,
            "c": self.params.c,
            "boundary": self.params.boundary.name(),
            "sources": self.params.sources,
            "init": self.setup.init,
            "barriers": self.setup.barriers,
        })
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
                "description": "Time step (no CFL check is applied)"
            },
            "c": {
                "type": "number",
                "default": DEFAULT_C,
                "description": "Wave speed"
            },
            "boundary": {
                "type": "string",
                "default": Boundary::Reflect.name(),
                "enum": Boundary::ALL.iter().map(|b| b.name()).collect::<Vec<_>>(),
                "description": "Edge rule for the Laplacian of u"
            },
            "sources": {
                "type": "array",
                "default": [],
                "items": ["x", "y", "amplitude", "sigma", "omega"],
                "description": "Gaussian sources A·exp(-d²dx²/2σ²)·cos(tω) summed into f"
            },
            "init": {
                "type": "object",
                "default": WaveInit::Zero,
                "enum": ["zero", "random", "spot"],
                "description": "Initial u: zero, random in [0, 1), or a unit spot {x, y, radius}"
            },
            "barriers": {
                "type": "array",
                "default": [],
                "enum": ["double_slit", "rect"],
                "description": "Mask regions painted on reset; mask 1 pins u = 0, fractions damp u at a dt-scaled rate"
            }
        })
    }

    fn update_params(&mut self, params: &Value) -> Result<(), EngineError> {
        let merged = self.params.merged(params)?;
        let setup = merge_setup(&self.setup, params)?;
        self.params = merged;
        self.setup = setup;
        Ok(())
    }

    fn reinitialize(&mut self) {
        self.apply_setup();
        info!(
            init = self.setup.init.name(),
            barriers = self.setup.barriers.len(),
            "wave world re-initialised"
        );
    }

    fn time(&self) -> f64 {
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(field: &Field) -> Vec<u64> {
        field.data().iter().map(|v| v.to_bits()).collect()
    }

    fn zero_engine(w: usize, h: usize, params: WaveParams) -> Waves {
        Waves::new(w, h, 42, params, WaveSetup::default()).unwrap()
    }

    fn wall_row(row: usize) -> Barrier {
        Barrier::Rect {
            x0: 0,
            x1: usize::MAX,
            y0: row,
            y1: row + 1,
            mask: 1.0,
        }
    }

    // ---- Construction ----

    #[test]
    fn new_zero_world_has_four_zero_channels() {
        let e = zero_engine(12, 8, WaveParams::default());
        assert_eq!(e.channel_names(), &["u", "v", "f", "mask"]);
        for i in 0..4 {
            let ch = e.channel(i).unwrap();
            assert_eq!((ch.width(), ch.height()), (12, 8));
            assert!(ch.data().iter().all(|&v| v == 0.0));
        }
        assert!(e.channel(4).is_none());
    }

    #[test]
    fn new_rejects_bad_spacing_and_sigma() {
        let bad_dx = WaveParams {
            dx: f64::NAN,
            ..WaveParams::default()
        };
        assert!(Waves::new(4, 4, 1, bad_dx, WaveSetup::default()).is_err());

        let bad_source = WaveParams {
            sources: vec![Source {
                x: 0,
                y: 0,
                amplitude: 1.0,
                sigma: -1.0,
                omega: 1.0,
            }],
            ..WaveParams::default()
        };
        assert!(Waves::new(4, 4, 1, bad_source, WaveSetup::default()).is_err());
    }

    #[test]
    fn spot_init_sets_unit_displacement() {
        let setup = WaveSetup {
            init: WaveInit::Spot {
                x: 5.0,
                y: 5.0,
                radius: 2.0,
            },
            barriers: Vec::new(),
        };
        let e = Waves::new(11, 11, 1, WaveParams::default(), setup).unwrap();
        assert_eq!(e.u().get(5, 5), 1.0);
        assert_eq!(e.u().get(7, 5), 1.0);
        assert_eq!(e.u().get(7, 7), 0.0);
        assert!(e.u().data().iter().all(|&v| v == 0.0 || v == 1.0));
        assert!(e.v().data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn random_init_only_touches_u() {
        let setup = WaveSetup {
            init: WaveInit::Random,
            barriers: Vec::new(),
        };
        let e = Waves::new(16, 16, 9, WaveParams::default(), setup).unwrap();
        assert!(e.u().data().iter().all(|v| (0.0..1.0).contains(v)));
        assert!(e.u().data().iter().any(|&v| v > 0.0));
        assert!(e.mask().data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn barrier_overwrites_spot_and_sets_mask() {
        let mut setup = WaveSetup::double_slit(64, 64);
        setup.init = WaveInit::Spot {
            x: 32.0,
            y: 31.0,
            radius: 8.0,
        };
        let e = Waves::new(64, 64, 1, WaveParams::default(), setup).unwrap();
        // Wall at row 31, gaps at x in [21, 22) and [41, 42).
        assert_eq!(e.mask().get(0, 31), 1.0);
        assert_eq!(e.u().get(32, 31), 0.0);
        assert_eq!(e.mask().get(21, 31), 0.0);
        assert_eq!(e.mask().get(41, 31), 0.0);
        assert_eq!(e.mask().get(42, 31), 1.0);
        assert_eq!(e.u().get(32, 30), 1.0);
    }

    #[test]
    fn from_json_reads_all_keys() {
        let e = Waves::from_json(
            20,
            20,
            3,
            &json!({
                "dx": 0.5,
                "dt": 0.001,
                "c": 3.0,
                "boundary": "toroidal",
                "sources": [{"x": 1, "y": 2, "amplitude": 1.0, "sigma": 2.0, "omega": 4.0}],
                "init": {"kind": "spot", "x": 10.0, "y": 10.0, "radius": 1.0},
                "barriers": [{"kind": "rect", "x0": 0, "x1": 20, "y0": 0, "y1": 1, "mask": 0.5}],
            }),
        )
        .unwrap();
        let p = e.wave_params();
        assert_eq!(p.dx, 0.5);
        assert_eq!(p.dt, 0.001);
        assert_eq!(p.c, 3.0);
        assert_eq!(p.boundary, Boundary::Toroidal);
        assert_eq!(p.sources.len(), 1);
        assert_eq!(e.mask().get(7, 0), 0.5);
        assert_eq!(e.u().get(10, 10), 1.0);
    }

    #[test]
    fn from_json_accepts_init_by_name() {
        let e = Waves::from_json(8, 8, 3, &json!({"init": "random"})).unwrap();
        assert_eq!(e.setup().init, WaveInit::Random);
        assert!(Waves::from_json(8, 8, 3, &json!({"init": "spot"})).is_err());
        assert!(Waves::from_json(8, 8, 3, &json!({"init": "ripple"})).is_err());
    }

    #[test]
    fn from_json_rejects_unknown_boundary_and_bad_sources() {
        assert!(Waves::from_json(8, 8, 1, &json!({"boundary": "absorb"})).is_err());
        assert!(Waves::from_json(8, 8, 1, &json!({"sources": [{"x": 1}]})).is_err());
    }

    #[test]
    fn params_round_trip_through_update() {
        let mut a = Waves::new(
            16,
            16,
            1,
            WaveParams::default(),
            WaveSetup::double_slit(16, 16),
        )
        .unwrap();
        a.update_params(&json!({"c": 7.0, "sources": [{"x": 3, "y": 3, "amplitude": 1.0, "sigma": 1.0, "omega": 2.0}]}))
            .unwrap();
        let snapshot = a.params();
        let b = Waves::from_json(16, 16, 1, &snapshot).unwrap();
        assert_eq!(b.wave_params(), a.wave_params());
        assert_eq!(b.setup(), a.setup());
    }

    #[test]
    fn param_schema_covers_every_param() {
        let e = zero_engine(4, 4, WaveParams::default());
        let schema = e.param_schema();
        for key in e.params().as_object().unwrap().keys() {
            assert!(schema.get(key).is_some(), "schema missing parameter: {key}");
            assert!(schema[key].get("description").is_some());
        }
    }

    // ---- Step correctness ----

    #[test]
    fn masked_cell_stays_pinned_next_to_large_displacement() {
        let setup = WaveSetup {
            init: WaveInit::Zero,
            barriers: vec![wall_row(4)],
        };
        let mut e = Waves::new(9, 9, 1, WaveParams::default(), setup).unwrap();
        e.channels_mut().0.fill_with(|_, y| if y == 4 { 0.0 } else { 50.0 });
        for _ in 0..200 {
            e.step().unwrap();
            for x in 0..9 {
                assert_eq!(e.u().get(x, 4), 0.0, "masked cell moved at x = {x}");
            }
        }
        assert!(e.v().get(4, 4) != 0.0, "velocity is not pinned, only u");
    }

    fn sponge_cell(dt: f64) -> Waves {
        let setup = WaveSetup {
            init: WaveInit::Zero,
            barriers: vec![Barrier::Rect {
                x0: 0,
                x1: 1,
                y0: 0,
                y1: 1,
                mask: 0.25,
            }],
        };
        let params = WaveParams {
            dt,
            ..WaveParams::default()
        };
        let mut e = Waves::new(1, 1, 1, params, setup).unwrap();
        e.channels_mut().0.set(0, 0, 1.0);
        e
    }

    #[test]
    fn fractional_mask_attenuates_each_tick() {
        let mut e = sponge_cell(DEFAULT_DT);
        e.step().unwrap();
        assert_eq!(e.u().get(0, 0), 0.75);
        e.step().unwrap();
        assert_eq!(e.u().get(0, 0), 0.5625);
        assert_eq!(e.mask().get(0, 0), 0.25);
    }

    #[test]
    fn fractional_mask_scales_with_dt() {
        let mut half = sponge_cell(DEFAULT_DT / 2.0);
        half.step().unwrap();
        half.step().unwrap();
        assert!((half.u().get(0, 0) - 0.75).abs() < 1e-12);

        let mut frozen = sponge_cell(0.0);
        for _ in 0..5 {
            frozen.step().unwrap();
        }
        assert_eq!(frozen.u().get(0, 0), 1.0);
    }

    #[test]
    fn mask_above_one_is_clamped() {
        let setup = WaveSetup {
            init: WaveInit::Zero,
            barriers: vec![Barrier::Rect {
                x0: 0,
                x1: 1,
                y0: 0,
                y1: 1,
                mask: 3.0,
            }],
        };
        let mut e = Waves::new(1, 1, 1, WaveParams::default(), setup).unwrap();
        e.channels_mut().0.set(0, 0, 1.0);
        e.step().unwrap();
        assert_eq!(e.u().get(0, 0), 0.0);
        assert_eq!(e.mask().get(0, 0), 3.0);
    }

    #[test]
    fn single_cell_update_matches_law() {
        // 3x3 with a spike: check centre and an edge neighbour by hand.
        let params = WaveParams {
            dt: 0.01,
            c: 2.0,
            ..WaveParams::default()
        };
        let mut e = zero_engine(3, 3, params);
        e.channels_mut().0.set(1, 1, 1.0);
        e.channels_mut().2.set(1, 1, 0.5);
        e.step().unwrap();

        // centre: Lu = -4, v' = 0.01·(4·(-4) − 0.5), u' = 1 + 0.01·v'
        let v_c = 0.01 * (4.0 * -4.0 - 0.5);
        assert!((e.v().get(1, 1) - v_c).abs() < 1e-15);
        assert!((e.u().get(1, 1) - (1.0 + 0.01 * v_c)).abs() < 1e-15);
        // edge neighbour: Lu = 1, v' = 0.04
        assert!((e.v().get(1, 0) - 0.04).abs() < 1e-15);
        // no sources: forcing is cleared
        assert_eq!(e.forcing().get(1, 1), 0.0);
    }

    fn all_channels(e: &Waves) -> Vec<Vec<u64>> {
        (0..4).map(|i| bits(e.channel(i).unwrap())).collect()
    }

    #[test]
    fn zero_dt_is_idempotent() {
        let params = WaveParams {
            dt: 0.0,
            sources: Source::demo_pair(64, 64),
            ..WaveParams::default()
        };
        let mut setup = WaveSetup::double_slit(64, 64);
        setup.barriers.push(Barrier::Rect {
            x0: 0,
            x1: 64,
            y0: 60,
            y1: 64,
            mask: 0.3,
        });
        let mut e = Waves::new(64, 64, 5, params, setup).unwrap();
        e.channels_mut().0.fill_with(|x, y| if y >= 60 { (x % 3) as f64 } else { 0.0 });
        let before = all_channels(&e);
        for _ in 0..5 {
            e.step().unwrap();
        }
        let after = all_channels(&e);
        for (name, (b, a)) in ["u", "v", "f", "mask"].iter().zip(before.iter().zip(&after)) {
            assert_eq!(b, a, "channel {name} changed under dt = 0");
        }
        assert_eq!(e.time(), 0.0);
    }

    #[test]
    fn forcing_is_seeded_at_time_zero() {
        let sources = Source::demo_pair(32, 32);
        let params = WaveParams {
            sources: sources.clone(),
            ..WaveParams::default()
        };
        let e = zero_engine(32, 32, params);
        let (x, y) = (sources[0].x as usize, sources[0].y as usize);
        let expected: f64 = sources.iter().fold(0.0, |acc, s| acc + s.forcing(x, y, 1.0, 0.0));
        assert_eq!(e.forcing().get(x, y), expected);
        assert!(expected > 0.0);
    }

    #[test]
    fn sources_drive_forcing_and_time_advances() {
        let params = WaveParams {
            dt: 0.01,
            sources: vec![Source {
                x: 2,
                y: 2,
                amplitude: 3.0,
                sigma: 1.0,
                omega: 5.0,
            }],
            ..WaveParams::default()
        };
        let mut e = zero_engine(5, 5, params);
        assert_eq!(e.forcing().get(2, 2), 3.0);
        e.step().unwrap();
        // First tick evaluates at t = 0 and v reads the seeded forcing.
        assert_eq!(e.forcing().get(2, 2), 3.0);
        assert!((e.v().get(2, 2) + 0.03).abs() < 1e-15);
        e.step().unwrap();
        assert!((e.forcing().get(2, 2) - 3.0 * (0.01_f64 * 5.0).cos()).abs() < 1e-12);
        assert!(e.v().get(2, 2) < 0.0, "forcing pushes v negative");
        assert!((e.time() - 0.02).abs() < 1e-15);
    }

    #[test]
    fn dirichlet_and_reflect_edges_differ() {
        let run = |boundary| {
            let params = WaveParams {
                dt: 0.01,
                boundary,
                ..WaveParams::default()
            };
            let mut e = Waves::new(5, 5, 1, params, WaveSetup::default()).unwrap();
            e.channels_mut().0.fill(1.0);
            e.step().unwrap();
            e.u().get(0, 2)
        };
        assert_eq!(run(Boundary::Reflect), 1.0);
        assert_eq!(run(Boundary::Toroidal), 1.0);
        assert!(run(Boundary::Dirichlet) < 1.0);
    }

    #[test]
    fn unstable_dt_diverges() {
        let params = WaveParams {
            dt: 1.0,
            ..WaveParams::default()
        };
        let mut e = zero_engine(8, 8, params);
        e.channels_mut().0.set(4, 4, 1.0);
        for _ in 0..200 {
            e.step().unwrap();
        }
        assert!(!e.u().is_finite());
    }

    // ---- Reset ----

    #[test]
    fn reinitialize_repaints_barrier_and_resets_time() {
        let mut e = Waves::new(
            32,
            32,
            1,
            WaveParams::default(),
            WaveSetup::double_slit(32, 32),
        )
        .unwrap();
        let mask_before = bits(e.mask());
        let u_before = bits(e.u());
        e.channels_mut().3.fill(0.0);
        for _ in 0..10 {
            e.step().unwrap();
        }
        e.reinitialize();
        assert_eq!(e.time(), 0.0);
        assert_eq!(mask_before, bits(e.mask()));
        assert_eq!(u_before, bits(e.u()));
    }

    #[test]
    fn update_params_rejects_and_keeps_previous() {
        let mut e = zero_engine(4, 4, WaveParams::default());
        assert!(e.update_params(&json!({"c": 2.0, "dt": -1.0})).is_err());
        assert_eq!(e.wave_params(), &WaveParams::default());
    }

    #[test]
    fn engine_is_object_safe() {
        let boxed: Box<dyn Engine> = Box::new(zero_engine(6, 6, WaveParams::default()));
        assert_eq!(boxed.channel_by_name("mask").unwrap().width(), 6);
    }

    // ---- Property-based tests ----

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn boundary() -> impl Strategy<Value = Boundary> {
            prop_oneof![
                Just(Boundary::Reflect),
                Just(Boundary::Dirichlet),
                Just(Boundary::Toroidal)
            ]
        }

        proptest! {
            #[test]
            fn fully_masked_cells_never_move(
                w in 3_usize..16,
                h in 3_usize..16,
                seed: u64,
                boundary in boundary(),
                wall in 0_usize..3,
                steps in 1_usize..40,
            ) {
                let setup = WaveSetup {
                    init: WaveInit::Random,
                    barriers: vec![wall_row(wall)],
                };
                let params = WaveParams { dt: 0.001, boundary, ..WaveParams::default() };
                let mut e = Waves::new(w, h, seed, params, setup).unwrap();
                for _ in 0..steps {
                    e.step().unwrap();
                }
                for x in 0..w {
                    prop_assert_eq!(e.u().get(x, wall), 0.0);
                }
            }

            #[test]
            fn zero_dt_keeps_every_channel(
                w in 1_usize..12,
                h in 1_usize..12,
                seed: u64,
                boundary in boundary(),
                sponge in 0.0_f64..1.0,
            ) {
                let setup = WaveSetup {
                    init: WaveInit::Random,
                    barriers: vec![Barrier::Rect { x0: 0, x1: w, y0: 0, y1: 1, mask: sponge }],
                };
                let params = WaveParams {
                    dt: 0.0,
                    boundary,
                    sources: Source::demo_pair(w, h),
                    ..WaveParams::default()
                };
                let mut e = Waves::new(w, h, seed, params, setup).unwrap();
                e.channels_mut().0.fill(0.5);
                let before = all_channels(&e);
                for _ in 0..5 {
                    e.step().unwrap();
                }
                prop_assert_eq!(before, all_channels(&e));
            }
        }
    }
}
