// ct-core/src/units.rs

use uom::si::f64::{
    ElectricCharge as UomElectricCharge, ElectricalResistance as UomElectricalResistance,
    HeatCapacity as UomHeatCapacity,
};

// Public canonical unit types (SI, f64)
pub type Charge = UomElectricCharge;
pub type Resistance = UomElectricalResistance;
pub type HeatCapacity = UomHeatCapacity;

#[inline]
pub fn ah(v: f64) -> Charge {
    use uom::si::electric_charge::ampere_hour;
    Charge::new::<ampere_hour>(v)
}

#[inline]
pub fn ohm(v: f64) -> Resistance {
    use uom::si::electrical_resistance::ohm;
    Resistance::new::<ohm>(v)
}

#[inline]
pub fn j_per_k(v: f64) -> HeatCapacity {
    use uom::si::heat_capacity::joule_per_kelvin;
    HeatCapacity::new::<joule_per_kelvin>(v)
}

/// Raw SI accessors used on the simulation hot path.
#[inline]
pub fn coulombs(q: Charge) -> f64 {
    use uom::si::electric_charge::coulomb;
    q.get::<coulomb>()
}

#[inline]
pub fn amp_hours(q: Charge) -> f64 {
    use uom::si::electric_charge::ampere_hour;
    q.get::<ampere_hour>()
}

#[inline]
pub fn ohms(r: Resistance) -> f64 {
    use uom::si::electrical_resistance::ohm;
    r.get::<ohm>()
}

#[inline]
pub fn joules_per_kelvin(c: HeatCapacity) -> f64 {
    use uom::si::heat_capacity::joule_per_kelvin;
    c.get::<joule_per_kelvin>()
}

pub mod constants {
    /// Seconds per hour, for ampere-hour to coulomb conversion.
    pub const SECONDS_PER_HOUR: f64 = 3600.0;
}
