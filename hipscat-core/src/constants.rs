#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const HALF_PI: f64 = 1.5707963267948966192313216;

/// 2/π, the factor that maps a longitude in radians onto the four base-face columns.
#[allow(clippy::excessive_precision)]
pub const TWO_OVER_PI: f64 = 0.6366197723675813430755350534900574;

#[allow(clippy::excessive_precision)]
pub const DEG_TO_RAD: f64 = 1.745329251994329576923691e-2;

#[allow(clippy::excessive_precision)]
pub const RAD_TO_DEG: f64 = 57.29577951308232087679815;

#[allow(clippy::excessive_precision)]
pub const ARCSEC_TO_RAD: f64 = 4.848136811095359935899141e-6;

pub const ARCSEC_PER_DEGREE: f64 = 3600.0;

/// Square degrees covered by the whole sphere, 4π·(180/π)².
#[allow(clippy::excessive_precision)]
pub const SPHERE_AREA_DEG2: f64 = 41252.96124941927103;

/// |z| = sin(dec) boundary between the equatorial belt and the polar caps.
pub const TWO_THIRDS: f64 = 2.0 / 3.0;
