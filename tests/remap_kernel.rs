use bowtie::lowlevel::{remap_row, stretch_line};
use bowtie::{Argb, ArgbImage, GeometryModel};

fn red(r: u8, a: u8) -> Argb {
    Argb::new(a, r, 0, 0)
}

#[test]
fn two_pixel_step_truncates_midpoint() {
    // Left pass: one step of delta 2 from the centre pixel (red 0) to the
    // left pixel (red 100).
    let src = [red(100, 10), red(0, 200)];
    let mut dst = vec![0u32; 4];
    stretch_line(&src, &[2.0, 1.0, 1.0], &mut dst);

    let step_start = Argb::from_packed(dst[2]);
    let step_mid = Argb::from_packed(dst[1]);
    assert_eq!(step_start.r, 0);
    assert_eq!(step_mid.r, 50);
    assert_eq!(step_mid.a, 200, "alpha comes from the step start");
    assert_eq!(dst[0], 0);
    assert_eq!(dst[3], 0);
}

#[test]
fn every_written_alpha_is_a_step_start_alpha() {
    let width = 257;
    let src: Vec<Argb> = (0..width)
        .map(|x| {
            let a = if x % 2 == 0 { 0x10 } else { 0xF0 };
            Argb::new(a, (x * 3) as u8, (x * 7) as u8, 255 - x as u8)
        })
        .collect();
    let model = GeometryModel::new(width);
    let mut dst = vec![0u32; model.rectified_width()];
    stretch_line(&src, model.profile().factors(), &mut dst);

    let mut written = 0;
    for &value in &dst {
        let a = Argb::from_packed(value).a;
        assert!(a == 0 || a == 0x10 || a == 0xF0, "blended alpha {a:#x}");
        if a != 0 {
            written += 1;
        }
    }
    // The last edge factor is never consumed, leaving a short unwritten tail.
    assert!(written + 8 >= dst.len());
}

#[test]
fn uniform_row_stays_uniform() {
    let colour = Argb::new(0x80, 12, 34, 56);
    let src = vec![colour; 100];
    let model = GeometryModel::new(100);
    let mut dst = vec![0u32; model.rectified_width()];
    stretch_line(&src, model.profile().factors(), &mut dst);
    let filled = dst.iter().filter(|&&v| v == colour.to_packed()).count();
    assert!(filled + 8 >= dst.len());
    assert!(dst.iter().all(|&v| v == 0 || v == colour.to_packed()));
}

#[test]
fn remap_row_reads_through_the_buffer_contract() {
    let img = ArgbImage::from_fn(40, 3, |x, y| Argb::opaque(x as u8, y as u8, 9)).unwrap();
    let model = GeometryModel::new(40);
    let factors = model.profile();

    let mut scratch = Vec::new();
    let mut via_buffer = vec![0u32; model.rectified_width()];
    remap_row(&img, 2, factors.factors(), &mut scratch, &mut via_buffer);

    let row: Vec<Argb> = img
        .row(2)
        .unwrap()
        .iter()
        .map(|&v| Argb::from_packed(v))
        .collect();
    let mut direct = vec![0u32; model.rectified_width()];
    stretch_line(&row, factors.factors(), &mut direct);
    assert_eq!(via_buffer, direct);
    assert_eq!(scratch, row);
}

#[test]
fn centre_pixel_lands_mid_destination() {
    let src: Vec<Argb> = (0..9).map(|x| Argb::opaque(x * 20, 0, 0)).collect();
    let model = GeometryModel::new(9);
    let mut dst = vec![0u32; model.rectified_width()];
    stretch_line(&src, model.profile().factors(), &mut dst);
    assert_eq!(dst[dst.len() / 2], src[4].to_packed());
}
