use crate::raycaster::ColumnSlice;

const CROSSHAIR_ARM: usize = 12;

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // 0RGB, as softbuffer expects
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
}

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub ceiling: u32,
    pub floor: u32,
    pub crosshair: u32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ceiling: pack_rgb(10, 10, 10),
            floor: pack_rgb(40, 40, 40),
            crosshair: pack_rgb(255, 255, 255),
        }
    }
}

/// Draw one frame: ceiling and floor halves, one grey wall slice per column,
/// centred vertically, then the crosshair.
pub fn render_frame(
    buf: &mut [u32],
    width: usize,
    height: usize,
    columns: &[ColumnSlice],
    palette: &Palette,
) {
    debug_assert_eq!(buf.len(), width * height);

    let mid = height / 2;
    buf[..mid * width].fill(palette.ceiling);
    buf[mid * width..].fill(palette.floor);

    for (x, slice) in columns.iter().take(width).enumerate() {
        let half = (slice.height / 2) as usize;
        let top = mid.saturating_sub(half);
        let bottom = (mid + half).min(height - 1);

        let color = pack_rgb(slice.shade, slice.shade, slice.shade);
        let mut idx = top * width + x;
        for _y in top..=bottom {
            buf[idx] = color;
            idx += width;
        }
    }

    draw_crosshair(buf, width, height, palette.crosshair);
}

fn draw_crosshair(buf: &mut [u32], width: usize, height: usize, color: u32) {
    let (cx, cy) = (width / 2, height / 2);
    if cx < CROSSHAIR_ARM || cy < CROSSHAIR_ARM || cx + CROSSHAIR_ARM >= width {
        return;
    }

    let row = cy * width;
    buf[row + cx - CROSSHAIR_ARM..=row + cx + CROSSHAIR_ARM].fill(color);
    for y in (cy - CROSSHAIR_ARM)..=(cy + CROSSHAIR_ARM).min(height - 1) {
        buf[y * width + cx] = color;
    }
}
