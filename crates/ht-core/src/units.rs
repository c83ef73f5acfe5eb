//! Canonical unit types and the scalar conversions used across the twin.
//!
//! Test procedures are written in psi/gallons/inches while the physics runs
//! in SI, so the imperial<->SI helpers below are used by every crate that
//! touches recorded data or vendor datasheets. Factors come from uom, not
//! hand-typed constants.

use uom::si::f64::{
    Area as UomArea, Length as UomLength, MassDensity as UomMassDensity,
    Pressure as UomPressure, Ratio as UomRatio, Time as UomTime, Volume as UomVolume,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type Density = UomMassDensity;
pub type Length = UomLength;
pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
pub type Time = UomTime;
pub type Volume = UomVolume;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn psi(v: f64) -> Pressure {
    use uom::si::pressure::pound_force_per_square_inch;
    Pressure::new::<pound_force_per_square_inch>(v)
}

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

#[inline]
pub fn m3(v: f64) -> Volume {
    use uom::si::volume::cubic_meter;
    Volume::new::<cubic_meter>(v)
}

#[inline]
pub fn gal(v: f64) -> Volume {
    use uom::si::volume::gallon;
    Volume::new::<gallon>(v)
}

#[inline]
pub fn liter(v: f64) -> Volume {
    use uom::si::volume::liter;
    Volume::new::<liter>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn inch(v: f64) -> Length {
    use uom::si::length::inch;
    Length::new::<inch>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

// Scalar conversions for code that carries plain f64 with unit-suffixed
// names (parameter structs, recorded series).

#[inline]
pub fn psi_to_pa(v: f64) -> f64 {
    use uom::si::pressure::pascal;
    psi(v).get::<pascal>()
}

#[inline]
pub fn pa_to_psi(v: f64) -> f64 {
    use uom::si::pressure::pound_force_per_square_inch;
    pa(v).get::<pound_force_per_square_inch>()
}

#[inline]
pub fn bar_to_psi(v: f64) -> f64 {
    use uom::si::pressure::pound_force_per_square_inch;
    bar(v).get::<pound_force_per_square_inch>()
}

#[inline]
pub fn gal_to_m3(v: f64) -> f64 {
    use uom::si::volume::cubic_meter;
    gal(v).get::<cubic_meter>()
}

#[inline]
pub fn m3_to_gal(v: f64) -> f64 {
    use uom::si::volume::gallon;
    m3(v).get::<gallon>()
}

#[inline]
pub fn liter_to_m3(v: f64) -> f64 {
    use uom::si::volume::cubic_meter;
    liter(v).get::<cubic_meter>()
}

#[inline]
pub fn inch_to_m(v: f64) -> f64 {
    use uom::si::length::meter;
    inch(v).get::<meter>()
}

#[inline]
pub fn m_to_inch(v: f64) -> f64 {
    use uom::si::length::inch;
    m(v).get::<inch>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _p = pa(101_325.0);
        let _b = bar(207.0);
        let _v = m3(0.02);
        let _l = m(2.0);
        let _dt = s(0.1);
        let _r = unitless(0.5);
    }

    #[test]
    fn psi_conversion_matches_field_constant() {
        // Procedures quote 1 psi = 6894.757 Pa
        assert!((psi_to_pa(1.0) - 6894.757).abs() < 1e-2);
        assert!((pa_to_psi(6894.757) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn imperial_volume_and_length() {
        assert!((gal_to_m3(1.0) - 0.003785411784).abs() < 1e-9);
        assert!((liter_to_m3(1.0) - 0.001).abs() < 1e-12);
        assert!((inch_to_m(1.0) - 0.0254).abs() < 1e-12);
        assert!((m_to_inch(0.0254) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn bar_to_psi_round_numbers() {
        // 1 bar ~ 14.5038 psi
        assert!((bar_to_psi(1.0) - 14.5038).abs() < 1e-3);
    }
}
