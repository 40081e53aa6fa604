//! Native HEALPix NEST backend.
//!
//! Pixels are addressed as `(face, x, y)` internally: `face` is one of the 12
//! base tiles and `x`, `y` are the column/row inside it, `0..nside`. A NEST
//! index is `face · nside² + interleave(x, y)`, with the bits of `x` on the even
//! positions and the bits of `y` on the odd ones. Row `y` grows toward the
//! north-west edge of a face and column `x` toward the north-east edge, so the
//! four children of a pixel `p` are `4p` (south), `4p+1` (east), `4p+2` (west)
//! and `4p+3` (north).
//!
//! Face layout follows Gorski et al. (2005): faces 0–3 touch the north pole,
//! 4–7 straddle the equator, 8–11 touch the south pole.

use hipscat_core::constants::{DEG_TO_RAD, HALF_PI, RAD_TO_DEG, TWO_OVER_PI, TWO_THIRDS};
use hipscat_core::math::isqrt;
use hipscat_core::utils::normalize_ra;

use super::{Direction, SpherePixelization};

/// Ring number of each face's southernmost corner, in units of `nside`.
const JRLL: [i64; 12] = [2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4];
/// Longitude of each face's centre, in units of π/4.
const JPLL: [i64; 12] = [1, 3, 5, 7, 0, 2, 4, 6, 1, 3, 5, 7];

const X_OFFSET: [i64; 8] = [-1, -1, 0, 1, 1, 1, 0, -1];
const Y_OFFSET: [i64; 8] = [0, 1, 1, 1, 0, -1, -1, -1];

/// Neighbouring face, indexed by `[4 + dx + 3·dy][face]`; `-1` where no face exists.
const FACE_ARRAY: [[i8; 12]; 9] = [
    [8, 9, 10, 11, -1, -1, -1, -1, 10, 11, 8, 9],
    [5, 6, 7, 4, 8, 9, 10, 11, 9, 10, 11, 8],
    [-1, -1, -1, -1, 5, 6, 7, 4, -1, -1, -1, -1],
    [4, 5, 6, 7, 11, 8, 9, 10, 11, 8, 9, 10],
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
    [1, 2, 3, 0, 0, 1, 2, 3, 5, 6, 7, 4],
    [-1, -1, -1, -1, 7, 4, 5, 6, -1, -1, -1, -1],
    [3, 0, 1, 2, 3, 0, 1, 2, 4, 5, 6, 7],
    [2, 3, 0, 1, -1, -1, -1, -1, 0, 1, 2, 3],
];

/// Coordinate fix-ups when crossing into a neighbouring face, indexed by
/// `[4 + dx + 3·dy][face / 4]`. Bit 1 mirrors `x`, bit 2 mirrors `y`, bit 4
/// swaps them.
const SWAP_ARRAY: [[u8; 3]; 9] = [
    [0, 0, 3],
    [0, 0, 6],
    [0, 0, 0],
    [0, 0, 5],
    [0, 0, 0],
    [5, 0, 0],
    [0, 0, 0],
    [6, 0, 0],
    [3, 0, 0],
];

/// HEALPix NEST scheme computed with bit manipulation.
///
/// Every method assumes `order <= 29` and `index < 12·4^order`; the checked
/// entry points in [`crate::order`] validate before delegating here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Nested;

impl SpherePixelization for Nested {
    fn neighbours(&self, order: u8, index: u64) -> [Option<u64>; 8] {
        let nside = 1i64 << order;
        let (ix, iy, face) = nest_to_xyf(order, index);
        let mut result = [None; 8];

        for direction in Direction::ALL {
            let i = direction.index();
            let mut x = ix + X_OFFSET[i];
            let mut y = iy + Y_OFFSET[i];
            let mut nbnum = 4usize;

            if x < 0 {
                x += nside;
                nbnum -= 1;
            } else if x >= nside {
                x -= nside;
                nbnum += 1;
            }
            if y < 0 {
                y += nside;
                nbnum -= 3;
            } else if y >= nside {
                y -= nside;
                nbnum += 3;
            }

            let nb_face = FACE_ARRAY[nbnum][face as usize];
            if nb_face < 0 {
                continue;
            }

            let bits = SWAP_ARRAY[nbnum][face as usize >> 2];
            if bits & 1 != 0 {
                x = nside - x - 1;
            }
            if bits & 2 != 0 {
                y = nside - y - 1;
            }
            if bits & 4 != 0 {
                std::mem::swap(&mut x, &mut y);
            }
            result[i] = Some(xyf_to_nest(order, x, y, nb_face as i64));
        }

        result
    }

    fn to_ring(&self, order: u8, index: u64) -> u64 {
        let (x, y, face) = nest_to_xyf(order, index);
        xyf_to_ring(order, x, y, face)
    }

    fn from_ring(&self, order: u8, ring: u64) -> u64 {
        let (x, y, face) = ring_to_xyf(order, ring);
        xyf_to_nest(order, x, y, face)
    }

    fn boundary_samples(&self, order: u8, index: u64, step: u32) -> Vec<(f64, f64)> {
        let nside = (1u64 << order) as f64;
        let step = step.max(1) as usize;
        let (ix, iy, face) = nest_to_xyf(order, index);

        let dc = 0.5 / nside;
        let xc = (ix as f64 + 0.5) / nside;
        let yc = (iy as f64 + 0.5) / nside;
        let d = 1.0 / (step as f64 * nside);

        let mut samples = vec![(0.0, 0.0); 4 * step];
        for i in 0..step {
            let t = i as f64 * d;
            samples[i] = face_to_radec(xc + dc - t, yc + dc, face);
            samples[i + step] = face_to_radec(xc - dc, yc + dc - t, face);
            samples[i + 2 * step] = face_to_radec(xc - dc + t, yc - dc, face);
            samples[i + 3 * step] = face_to_radec(xc + dc, yc - dc + t, face);
        }
        samples
    }

    fn center(&self, order: u8, index: u64) -> (f64, f64) {
        let nside = (1u64 << order) as f64;
        let (ix, iy, face) = nest_to_xyf(order, index);
        face_to_radec((ix as f64 + 0.5) / nside, (iy as f64 + 0.5) / nside, face)
    }

    fn ang2pix(&self, order: u8, ra_deg: f64, dec_deg: f64) -> u64 {
        let nside = 1i64 << order;
        let nside_f = nside as f64;
        let phi = normalize_ra(ra_deg) * DEG_TO_RAD;
        let z = libm::sin(dec_deg.clamp(-90.0, 90.0) * DEG_TO_RAD);
        let z_abs = libm::fabs(z);

        let mut tt = phi * TWO_OVER_PI;
        if tt >= 4.0 {
            tt -= 4.0;
        }

        let (x, y, face) = if z_abs <= TWO_THIRDS {
            let temp1 = nside_f * (0.5 + tt);
            let temp2 = nside_f * z * 0.75;
            let jp = (temp1 - temp2) as i64;
            let jm = (temp1 + temp2) as i64;
            let ifp = jp >> order;
            let ifm = jm >> order;
            let face = equatorial_face(ifp, ifm);
            (jm & (nside - 1), nside - (jp & (nside - 1)) - 1, face)
        } else {
            let ntt = (tt as i64).min(3);
            let tp = tt - ntt as f64;
            let tmp = nside_f * libm::sqrt(3.0 * (1.0 - z_abs));
            let jp = ((tp * tmp) as i64).min(nside - 1);
            let jm = (((1.0 - tp) * tmp) as i64).min(nside - 1);
            if z >= 0.0 {
                (nside - jm - 1, nside - jp - 1, ntt)
            } else {
                (jp, jm, ntt + 8)
            }
        };

        xyf_to_nest(order, x, y, face)
    }
}

/// Face number from the two diagonal column indices of the equatorial belt.
fn equatorial_face(ifp: i64, ifm: i64) -> i64 {
    match ifp.cmp(&ifm) {
        std::cmp::Ordering::Equal => ifp | 4,
        std::cmp::Ordering::Less => ifp,
        std::cmp::Ordering::Greater => ifm + 8,
    }
}

/// Interleaves the low `order` bits of `v` onto the even bit positions.
fn spread_bits(v: u64, order: u8) -> u64 {
    let mut result = 0u64;
    for i in 0..order as u32 {
        result |= ((v >> i) & 1) << (2 * i);
    }
    result
}

/// Inverse of [`spread_bits`]: gathers the even bit positions.
fn compress_bits(v: u64, order: u8) -> u64 {
    let mut result = 0u64;
    for i in 0..order as u32 {
        result |= ((v >> (2 * i)) & 1) << i;
    }
    result
}

pub(crate) fn nest_to_xyf(order: u8, index: u64) -> (i64, i64, i64) {
    let shift = 2 * order as u32;
    let face = index >> shift;
    let in_face = index & ((1u64 << shift) - 1);
    let x = compress_bits(in_face, order);
    let y = compress_bits(in_face >> 1, order);
    (x as i64, y as i64, face as i64)
}

pub(crate) fn xyf_to_nest(order: u8, x: i64, y: i64, face: i64) -> u64 {
    let in_face = spread_bits(x as u64, order) | (spread_bits(y as u64, order) << 1);
    ((face as u64) << (2 * order as u32)) + in_face
}

fn xyf_to_ring(order: u8, x: i64, y: i64, face: i64) -> u64 {
    let nside = 1i64 << order;
    let nl4 = 4 * nside;
    let npix = 12 * nside * nside;
    let ncap = 2 * nside * (nside - 1);
    let f = face as usize;

    let jr = JRLL[f] * nside - x - y - 1;

    let (nr, n_before, kshift) = if jr < nside {
        (jr, 2 * jr * (jr - 1), 0)
    } else if jr > 3 * nside {
        let nr = nl4 - jr;
        (nr, npix - 2 * (nr + 1) * nr, 0)
    } else {
        (nside, ncap + (jr - nside) * nl4, (jr - nside) & 1)
    };

    let mut jp = (JPLL[f] * nr + x - y + 1 + kshift) / 2;
    if jp > nl4 {
        jp -= nl4;
    } else if jp < 1 {
        jp += nl4;
    }

    (n_before + jp - 1) as u64
}

fn ring_to_xyf(order: u8, ring: u64) -> (i64, i64, i64) {
    let nside = 1i64 << order;
    let nl2 = 2 * nside;
    let npix = 12 * nside * nside;
    let ncap = 2 * nside * (nside - 1);
    let pix = ring as i64;

    let (iring, iphi, kshift, nr, face) = if pix < ncap {
        let iring = (1 + isqrt((1 + 2 * pix) as u64) as i64) >> 1;
        let iphi = pix + 1 - 2 * iring * (iring - 1);
        let face = (iphi - 1) / iring;
        (iring, iphi, 0, iring, face)
    } else if pix < npix - ncap {
        let ip = pix - ncap;
        let tmp = ip >> (order as u32 + 2);
        let iring = tmp + nside;
        let iphi = ip - tmp * 4 * nside + 1;
        let kshift = (iring + nside) & 1;
        let ire = tmp + 1;
        let irm = nl2 + 1 - tmp;
        let ifm = (iphi - ire / 2 + nside - 1) >> order;
        let ifp = (iphi - irm / 2 + nside - 1) >> order;
        (iring, iphi, kshift, nside, equatorial_face(ifp, ifm))
    } else {
        let ip = npix - pix;
        let iring = (1 + isqrt((2 * ip - 1) as u64) as i64) >> 1;
        let iphi = 4 * iring + 1 - (ip - 2 * iring * (iring - 1));
        let face = (iphi - 1) / iring + 8;
        (4 * nside - iring, iphi, 0, iring, face)
    };

    let f = face as usize;
    let irt = iring - JRLL[f] * nside + 1;
    let mut ipt = 2 * iphi - JPLL[f] * nr - kshift - 1;
    if ipt >= nl2 {
        ipt -= 8 * nside;
    }

    ((ipt - irt) >> 1, (-ipt - irt) >> 1, face)
}

/// Sky position of fractional face coordinates `x, y ∈ [0, 1]`, in degrees.
fn face_to_radec(x: f64, y: f64, face: i64) -> (f64, f64) {
    let f = face as usize;
    let jr = JRLL[f] as f64 - x - y;

    let (nr, z) = if jr < 1.0 {
        (jr, 1.0 - jr * jr / 3.0)
    } else if jr > 3.0 {
        let nr = 4.0 - jr;
        (nr, nr * nr / 3.0 - 1.0)
    } else {
        (1.0, (2.0 - jr) * TWO_THIRDS)
    };

    let mut tmp = JPLL[f] as f64 * nr + x - y;
    if tmp < 0.0 {
        tmp += 8.0;
    }
    if tmp >= 8.0 {
        tmp -= 8.0;
    }
    let phi = if nr < 1e-15 {
        0.0
    } else {
        0.5 * HALF_PI * tmp / nr
    };

    let dec = libm::asin(z.clamp(-1.0, 1.0)) * RAD_TO_DEG;
    (normalize_ra(phi * RAD_TO_DEG), dec)
}
