use crate::app::clock::Easing;
use crate::config::ConfigError;

/// Rates, thresholds and tween parameters driving the phase timeline
///
/// Rates are per second. Result dwell thresholds are expressed in reveal
/// units (the reveal scalar grows at `result_reveal_rate` per second).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    pub content_fade_out_rate: f32,
    pub content_fade_in_rate: f32,
    /// Fade-in rate used by the main menu and launching screens
    pub menu_fade_in_rate: f32,
    pub window_fade_in_rate: f32,
    pub window_fade_out_rate: f32,
    pub window_easing: Easing,

    pub result_reveal_rate: f32,
    /// Reveal value after which a failed validation returns to login (T1)
    pub failure_dwell: f32,
    /// Reveal value after which a successful validation moves on (T2)
    pub success_dwell: f32,

    /// In-phase seconds before the launch task fires
    pub launch_start_after: f32,
    /// In-phase seconds before the launch result is polled
    pub launch_poll_after: f32,
    pub launch_bar_cycle: f32,

    pub shake_decay_rate: f32,
    pub shake_frequency: f32,
    pub shake_amplitude: f32,

    pub focus_rate: f32,
    pub hover_rate: f32,
    pub click_rate: f32,

    /// Spinner angular speed in radians per second
    pub spinner_speed: f32,
    /// Upper bound applied to every frame delta
    pub max_frame_delta: f32,
}

impl MotionConfig {
    pub const DEFAULT_FADE_RATE: f32 = 3.0;
    pub const DEFAULT_TWEEN_RATE: f32 = 10.0;

    pub fn validate(&self) -> Result<(), ConfigError> {
        let rates = [
            ("content_fade_out_rate", self.content_fade_out_rate),
            ("content_fade_in_rate", self.content_fade_in_rate),
            ("menu_fade_in_rate", self.menu_fade_in_rate),
            ("window_fade_in_rate", self.window_fade_in_rate),
            ("window_fade_out_rate", self.window_fade_out_rate),
            ("result_reveal_rate", self.result_reveal_rate),
            ("launch_bar_cycle", self.launch_bar_cycle),
            ("shake_decay_rate", self.shake_decay_rate),
            ("focus_rate", self.focus_rate),
            ("hover_rate", self.hover_rate),
            ("click_rate", self.click_rate),
            ("max_frame_delta", self.max_frame_delta),
        ];
        for (name, value) in rates {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        if self.success_dwell <= 0.0 || self.success_dwell >= self.failure_dwell {
            return Err(ConfigError::DwellOrder {
                success: self.success_dwell,
                failure: self.failure_dwell,
            });
        }

        if self.launch_start_after < 0.0 || self.launch_poll_after < self.launch_start_after {
            return Err(ConfigError::LaunchOrder {
                start: self.launch_start_after,
                poll: self.launch_poll_after,
            });
        }

        Ok(())
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            content_fade_out_rate: Self::DEFAULT_FADE_RATE,
            content_fade_in_rate: Self::DEFAULT_FADE_RATE,
            menu_fade_in_rate: 2.0,
            window_fade_in_rate: 2.0,
            window_fade_out_rate: 3.0,
            window_easing: Easing::CubicOut,
            result_reveal_rate: 1.5,
            failure_dwell: 2.0,
            success_dwell: 1.5,
            launch_start_after: 2.0,
            launch_poll_after: 2.1,
            launch_bar_cycle: 1.5,
            shake_decay_rate: 2.0,
            shake_frequency: 30.0,
            shake_amplitude: 10.0,
            focus_rate: Self::DEFAULT_TWEEN_RATE,
            hover_rate: Self::DEFAULT_TWEEN_RATE,
            click_rate: 20.0,
            spinner_speed: 6.0,
            max_frame_delta: 0.1,
        }
    }
}
