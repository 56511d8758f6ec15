use crate::linalg::{dot, map3, mix, normalize_or_zero, vec3, Vec3};

/// Half-width of the twilight band in sun-dot space, centered on the
/// terminator.
pub const TWILIGHT_WIDTH: f32 = 0.2;

/// Material inputs to the fragment pipeline.
#[derive(Clone, Debug)]
pub struct ShadingParams {
    pub base_color: Vec3,
    /// Blue cast added to the unlit side.
    pub night_tint: Vec3,
    /// Hover/selection override, added on top of the lighting.
    pub emissive: Vec3,
    pub emissive_intensity: f32,
    pub day_night_enabled: bool,
}

impl Default for ShadingParams {
    fn default() -> Self {
        ShadingParams {
            // #4a7c59, the muted land green
            base_color: vec3(74.0 / 255.0, 124.0 / 255.0, 89.0 / 255.0),
            night_tint: vec3(0.15, 0.2, 0.35),
            emissive: vec3(0.0, 0.0, 0.0),
            emissive_intensity: 0.0,
            day_night_enabled: true,
        }
    }
}

/// Clamped Hermite interpolation: 0 at `edge0`, 1 at `edge1`, smooth in
/// between.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Day/night illumination factor for a point on the morphing surface: 1 in
/// full day, 0 in full night, smooth across the twilight band. Day/night is
/// a globe effect, so with the toggle off or in flat mode (t >= 0.5) the
/// whole map reads as full day. Both direction vectors must be unit length.
pub fn day_night_factor(surface_dir: Vec3, sun_dir: Vec3, morph_progress: f32, enabled: bool) -> f32 {
    if !enabled || morph_progress >= 0.5 {
        return 1.0;
    }
    let sun_dot = dot(surface_dir, sun_dir);
    smoothstep(-TWILIGHT_WIDTH, TWILIGHT_WIDTH, sun_dot)
}

/// Full fragment color pipeline for the morphing surface, mirroring the
/// renderer's shader: day and night ambient mixed by the day/night factor,
/// sun diffuse scaled by it, a soft fill, a view-dependent rim that ignores
/// day/night, an additive emissive override, then soft tone mapping and
/// gamma. All direction vectors must be unit length.
pub fn shade_fragment(
    surface_dir: Vec3,
    normal: Vec3,
    view_dir: Vec3,
    sun_dir: Vec3,
    morph_progress: f32,
    params: &ShadingParams,
) -> Vec3 {
    let factor = day_night_factor(surface_dir, sun_dir, morph_progress, params.day_night_enabled);
    let color = params.base_color;

    let day_ambient = color * 0.5;
    let diffuse_strength = dot(normal, sun_dir).max(0.0);
    let day_diffuse = color * (diffuse_strength * 0.7);
    let night_ambient = color * 0.2 + params.night_tint;

    let ambient = mix(night_ambient, day_ambient, factor);
    let diffuse = day_diffuse * factor;
    // Soft fill light for overall visibility
    let fill = color * 0.15;
    let rim = (1.0 - dot(view_dir, normal).max(0.0)).powi(4);
    let rim_light = color * (rim * 0.1);
    let emissive = params.emissive * params.emissive_intensity;

    let combined = ambient + diffuse + fill + rim_light + emissive;
    let tone_mapped = map3(combined, |c| c / (c + 0.8));
    map3(tone_mapped, |c| c.powf(0.9))
}

/// Sun direction at a given orbit angle in radians. The sun circles the
/// equatorial plane with a slight fixed northern tilt.
pub fn sun_direction(angle: f32) -> Vec3 {
    normalize_or_zero(vec3(angle.cos(), 0.3, angle.sin()))
}

/// The scene's resting sun direction.
pub fn default_sun_direction() -> Vec3 {
    normalize_or_zero(vec3(1.0, 0.3, 0.5))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luminance(color: Vec3) -> f32 {
        let [r, g, b] = color.into_array();
        r + g + b
    }

    #[test]
    fn smoothstep_is_exact_outside_the_band() {
        assert_eq!(smoothstep(-0.2, 0.2, -1.0), 0.0);
        assert_eq!(smoothstep(-0.2, 0.2, -0.2), 0.0);
        assert_eq!(smoothstep(-0.2, 0.2, 0.2), 1.0);
        assert_eq!(smoothstep(-0.2, 0.2, 1.0), 1.0);
    }

    #[test]
    fn smoothstep_is_half_at_the_band_center() {
        assert_eq!(smoothstep(-0.2, 0.2, 0.0), 0.5);
    }

    #[test]
    fn factor_is_one_when_disabled_or_flat() {
        let surface = vec3(-1.0, 0.0, 0.0);
        let sun = vec3(1.0, 0.0, 0.0);
        // Midnight point, yet full day with the toggle off.
        assert_eq!(day_night_factor(surface, sun, 0.0, false), 1.0);
        // Same once the map lies flat.
        assert_eq!(day_night_factor(surface, sun, 0.5, true), 1.0);
        assert_eq!(day_night_factor(surface, sun, 0.9, true), 1.0);
    }

    #[test]
    fn noon_is_day_and_midnight_is_night() {
        let sun = vec3(1.0, 0.0, 0.0);
        assert_eq!(day_night_factor(vec3(1.0, 0.0, 0.0), sun, 0.0, true), 1.0);
        assert_eq!(day_night_factor(vec3(-1.0, 0.0, 0.0), sun, 0.0, true), 0.0);
    }

    #[test]
    fn terminator_is_half_lit() {
        let sun = vec3(1.0, 0.0, 0.0);
        let terminator = vec3(0.0, 0.0, 1.0);
        assert_eq!(day_night_factor(terminator, sun, 0.0, true), 0.5);
    }

    #[test]
    fn twilight_band_is_symmetric_about_the_terminator() {
        let sun = vec3(1.0, 0.0, 0.0);
        for sun_dot in [0.05f32, 0.1, 0.15] {
            let day_side = vec3(sun_dot, 0.0, (1.0 - sun_dot * sun_dot).sqrt());
            let night_side = vec3(-sun_dot, 0.0, (1.0 - sun_dot * sun_dot).sqrt());
            let sum = day_night_factor(day_side, sun, 0.0, true)
                + day_night_factor(night_side, sun, 0.0, true);
            assert!((sum - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn factor_grows_monotonically_and_continuously() {
        let sun = vec3(1.0, 0.0, 0.0);
        let mut previous = 0.0f32;
        let steps = 400;
        for i in 0..=steps {
            let angle = std::f32::consts::PI * (1.0 - i as f32 / steps as f32);
            let surface = vec3(angle.cos(), 0.0, angle.sin());
            let factor = day_night_factor(surface, sun, 0.0, true);
            assert!(factor >= previous - 1e-6, "dipped at step {i}");
            assert!(factor - previous < 0.05, "jumped at step {i}");
            previous = factor;
        }
        assert_eq!(previous, 1.0);
    }

    #[test]
    fn day_side_is_brighter_than_night_side() {
        let params = ShadingParams::default();
        let sun = vec3(1.0, 0.0, 0.0);
        let view = vec3(1.0, 0.0, 0.0);
        let noon = shade_fragment(vec3(1.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0), view, sun, 0.0, &params);
        let midnight =
            shade_fragment(vec3(-1.0, 0.0, 0.0), vec3(-1.0, 0.0, 0.0), view, sun, 0.0, &params);
        assert!(luminance(noon) > luminance(midnight));
    }

    #[test]
    fn night_side_keeps_a_blue_cast() {
        let params = ShadingParams::default();
        let sun = vec3(1.0, 0.0, 0.0);
        let midnight = shade_fragment(
            vec3(-1.0, 0.0, 0.0),
            vec3(-1.0, 0.0, 0.0),
            vec3(-1.0, 0.0, 0.0),
            sun,
            0.0,
            &params,
        );
        let [r, _, b] = midnight.into_array();
        assert!(b > r, "night tint should skew blue: {midnight:?}");
    }

    #[test]
    fn emissive_adds_light() {
        let sun = vec3(1.0, 0.0, 0.0);
        let surface = vec3(0.0, 0.0, 1.0);
        let plain = ShadingParams::default();
        let glowing = ShadingParams {
            emissive: vec3(1.0, 0.2, 0.2),
            emissive_intensity: 0.6,
            ..ShadingParams::default()
        };
        let base = shade_fragment(surface, surface, surface, sun, 0.0, &plain);
        let lit = shade_fragment(surface, surface, surface, sun, 0.0, &glowing);
        assert!(lit.into_array()[0] > base.into_array()[0]);
        assert!(luminance(lit) > luminance(base));
    }

    #[test]
    fn rim_light_ignores_the_day_night_factor() {
        let params = ShadingParams::default();
        let sun = vec3(1.0, 0.0, 0.0);
        let surface = vec3(-1.0, 0.0, 0.0);
        let head_on = shade_fragment(surface, surface, surface, sun, 0.0, &params);
        // Grazing view, same midnight surface.
        let grazing = shade_fragment(surface, surface, vec3(0.0, 1.0, 0.0), sun, 0.0, &params);
        assert!(luminance(grazing) > luminance(head_on));
    }

    #[test]
    fn output_channels_stay_inside_unit_range() {
        let hot = ShadingParams {
            emissive: vec3(10.0, 10.0, 10.0),
            emissive_intensity: 1.0,
            ..ShadingParams::default()
        };
        let sun = default_sun_direction();
        let surface = vec3(0.0, 1.0, 0.0);
        let color = shade_fragment(surface, surface, surface, sun, 0.0, &hot);
        for channel in color.into_array() {
            assert!((0.0..1.0).contains(&channel), "channel {channel}");
        }
    }

    #[test]
    fn sun_directions_are_unit_length() {
        assert!((default_sun_direction().length() - 1.0).abs() < 1e-6);
        for i in 0..8 {
            let angle = i as f32 * std::f32::consts::FRAC_PI_4;
            assert!((sun_direction(angle).length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn orbiting_sun_keeps_its_northern_tilt() {
        for angle in [0.0f32, 1.0, 2.5, 4.0] {
            let y = sun_direction(angle).into_array()[1];
            assert!(y > 0.0);
        }
    }
}
