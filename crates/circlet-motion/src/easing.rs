/// Stiffness and damping ratio of the spring curve. Underdamped, so a positive initial
/// velocity overshoots the target once before settling.
const SPRING_STIFFNESS: f64 = 12.0;
const SPRING_DAMPING: f64 = 0.45;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Easing {
    Linear,
    #[default]
    EaseInOut,
    /// Damped spring. `velocity` is the initial velocity in target distances per step
    /// duration.
    Spring { velocity: f64 },
}

impl Easing {
    /// Maps linear progress in `[0, 1]` onto eased progress. Every curve ends exactly on 1.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        if t >= 1.0 {
            return 1.0;
        }

        match *self {
            Self::Linear => t,
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::Spring { velocity } => spring(t, velocity),
        }
    }
}

fn spring(t: f64, velocity: f64) -> f64 {
    let decay = SPRING_DAMPING * SPRING_STIFFNESS;
    let damped = SPRING_STIFFNESS * (1.0 - SPRING_DAMPING * SPRING_DAMPING).sqrt();
    let envelope = (-decay * t).exp();
    1.0 - envelope * ((damped * t).cos() + (decay - velocity) / damped * (damped * t).sin())
}
