use chaos_viewer::engine::kaleidoscope::{kaleidoscope_source, Compositor};
use chaos_viewer::engine::{Canvas, Color, Surface};

const W: usize = 64;
const H: usize = 48;

/// Layer where every pixel has a distinct-ish colour.
fn paint_layer(c: &mut Compositor) {
    c.begin_frame();
    let layer = c.layer_mut();
    for y in 0..H {
        for x in 0..W {
            let v = (x * 31 + y * 17) as u32;
            layer.blend_pixel(
                x as i32,
                y as i32,
                Color::rgb((v & 0xFF) as u8, (x * 4) as u8, (y * 5) as u8),
            );
        }
    }
}

#[test]
fn every_output_pixel_comes_from_its_mapped_source() {
    for n in 1..=9u32 {
        let mut comp = Compositor::new(W, H, n);
        paint_layer(&mut comp);
        let mut out = Canvas::new(W, H);
        comp.compose(&mut out);
        for y in 0..H {
            for x in 0..W {
                let (sx, sy) = kaleidoscope_source(x, y, W, H, n);
                assert_eq!(
                    out.pixel(x, y),
                    comp.layer().pixel(sx, sy),
                    "n={n} at ({x},{y}) from ({sx},{sy})"
                );
            }
        }
    }
}

/// Source pixel for `(x, y)` worked out from the wedge geometry directly:
/// rotate back into the first wedge, mirroring every odd wedge. `None` near a
/// wedge edge, close to the centre, or when the source leaves the canvas.
fn folded_source(x: usize, y: usize, n: u32) -> Option<(usize, usize)> {
    use std::f64::consts::TAU;
    let (cx, cy) = (W as f64 / 2.0, H as f64 / 2.0);
    let (px, py) = (x as f64 + 0.5 - cx, y as f64 + 0.5 - cy);
    let r = px.hypot(py);
    if r < 3.0 {
        return None;
    }
    let wedge = TAU / n as f64;
    let theta = py.atan2(px).rem_euclid(TAU);
    let k = (theta / wedge).floor();
    let offset = theta - k * wedge;
    if offset < 0.02 || wedge - offset < 0.02 {
        return None;
    }
    let phi = if k as u32 % 2 == 0 { offset } else { wedge - offset };
    let (sx, sy) = (cx + r * phi.cos(), cy + r * phi.sin());
    if sx < 1.0 || sy < 1.0 || sx >= (W - 1) as f64 || sy >= (H - 1) as f64 {
        return None;
    }
    Some((sx.floor() as usize, sy.floor() as usize))
}

#[test]
fn wedges_rotate_and_mirror_the_first_wedge() {
    for n in 3..=9u32 {
        let mut comp = Compositor::new(W, H, n);
        paint_layer(&mut comp);
        let mut out = Canvas::new(W, H);
        comp.compose(&mut out);

        let (mut checked, mut mismatched) = (0usize, 0usize);
        for y in 0..H {
            for x in 0..W {
                let Some((sx, sy)) = folded_source(x, y, n) else {
                    continue;
                };
                checked += 1;
                let got = out.pixel(x, y);
                let near = (sy - 1..=sy + 1)
                    .flat_map(|ny| (sx - 1..=sx + 1).map(move |nx| (nx, ny)))
                    .any(|(nx, ny)| comp.layer().pixel(nx, ny) == got);
                if !near {
                    mismatched += 1;
                }
            }
        }
        assert!(checked > W * H / 2, "n={n} checked only {checked}");
        assert!(mismatched * 100 <= checked, "n={n}: {mismatched}/{checked} off");
    }
}

#[test]
fn single_segment_is_identity() {
    let mut comp = Compositor::new(W, H, 1);
    paint_layer(&mut comp);
    let mut out = Canvas::new(W, H);
    comp.compose(&mut out);
    assert_eq!(&out, comp.layer());
}

#[test]
fn first_wedge_maps_to_itself() {
    // Just below-right of centre sits at a small positive angle, inside wedge 0.
    for n in 2..=9u32 {
        let (x, y) = (W / 2 + 10, H / 2);
        assert_eq!(kaleidoscope_source(x, y, W, H, n), (x, y));
    }
}

#[test]
fn mirrored_halves_match_for_two_segments() {
    // With two wedges the lower half is the source and the upper half mirrors
    // it across the horizontal axis.
    let mut comp = Compositor::new(W, H, 2);
    paint_layer(&mut comp);
    let mut out = Canvas::new(W, H);
    comp.compose(&mut out);
    for x in 0..W {
        for dy in 1..H / 2 {
            let below = out.pixel(x, H / 2 + dy);
            let above = out.pixel(x, H / 2 - 1 - dy);
            assert_eq!(below, above, "x={x} dy={dy}");
        }
    }
}

#[test]
fn segment_change_applies_on_next_compose() {
    let mut comp = Compositor::new(W, H, 1);
    paint_layer(&mut comp);
    let mut identity = Canvas::new(W, H);
    comp.compose(&mut identity);

    comp.set_segments(4);
    assert_eq!(comp.segments(), 4);
    let mut folded = Canvas::new(W, H);
    comp.compose(&mut folded);
    assert_ne!(identity, folded);

    comp.set_segments(0);
    assert_eq!(comp.segments(), 1);
    comp.set_segments(12);
    assert_eq!(comp.segments(), 9);
}

#[test]
fn sources_are_always_in_bounds() {
    for n in 1..=9u32 {
        for y in 0..H {
            for x in 0..W {
                let (sx, sy) = kaleidoscope_source(x, y, W, H, n);
                assert!(sx < W && sy < H);
            }
        }
    }
}

#[test]
fn mismatched_output_is_left_untouched() {
    let mut comp = Compositor::new(W, H, 3);
    paint_layer(&mut comp);
    let mut out = Canvas::new(W / 2, H);
    comp.compose(&mut out);
    assert_eq!(out.lit_pixels(), 0);
}
