use hipscat_pixel::hipscat_id::{compute_hipscat_id, hipscat_id_to_healpix};
use hipscat_pixel::partition::{generate_alignment, generate_histogram, AlignmentParams};
use hipscat_pixel::{Nested, SpherePixelization};

/// Deterministic scatter over RA 280..310, Dec -65..-45.
fn synthetic_catalog(n: usize) -> Vec<(f64, f64)> {
    let mut state: u64 = 12345;
    let mut next = || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    (0..n)
        .map(|_| {
            let ra = 280.0 + 30.0 * next();
            let dec = -65.0 + 20.0 * next();
            (ra, dec)
        })
        .collect()
}

#[test]
fn test_histogram_alignment_ids() {
    let coords = synthetic_catalog(500);

    let histogram = generate_histogram(&coords, 2).unwrap();
    assert_eq!(histogram.iter().sum::<u64>(), 500);
    assert!(histogram[..176].iter().all(|&c| c == 0));

    let params = AlignmentParams {
        highest_order: 2,
        lowest_order: 0,
        threshold: 200,
    };
    let table = generate_alignment(&histogram, &params).unwrap();
    let map = table.destination_pixel_map(&histogram).unwrap();

    let mut covered = 0;
    for (destination, fine) in &map {
        assert!(destination.row_count <= params.threshold || destination.order == 2);
        assert!(destination.order >= 1, "the whole sample exceeds the threshold");
        covered += fine.len();
        for (rank, &pixel) in fine.iter().enumerate() {
            let entry = table.get(pixel).unwrap();
            assert_eq!(entry.destination, *destination);
            assert_eq!(entry.position, Some(rank as u64));
        }
    }
    assert_eq!(covered, histogram.iter().filter(|&&c| c > 0).count());

    let ids = compute_hipscat_id(&coords).unwrap();
    let order2 = hipscat_id_to_healpix(&ids, 2).unwrap();
    for ((&(ra, dec), &pixel), &id) in coords.iter().zip(&order2).zip(&ids) {
        assert_eq!(pixel, Nested.ang2pix(2, ra, dec));
        assert!(table.get(pixel).is_some(), "id {id:#x} maps to an unaligned pixel");
    }

    let mut sorted = ids.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), ids.len(), "identifiers must be unique");
}

#[test]
fn test_ids_sort_spatially() {
    let coords = synthetic_catalog(200);
    let ids = compute_hipscat_id(&coords).unwrap();

    let mut order: Vec<usize> = (0..ids.len()).collect();
    order.sort_by_key(|&i| ids[i]);
    let pixels: Vec<u64> = order
        .iter()
        .map(|&i| Nested.ang2pix(10, coords[i].0, coords[i].1))
        .collect();
    assert!(pixels.windows(2).all(|w| w[0] <= w[1]));
}
