use glam::{DVec2, IVec2, Vec2};

use super::options::{TextAlign, VerticalAlign};

/// Baseline anchor of the first line, in surface pixels.
///
/// `x` follows the horizontal alignment, `y` positions the block of
/// `line_count` lines so that top/middle/bottom alignment holds for the
/// whole block. The normalized `offset` is applied last. All arithmetic is
/// done in `f64` before flooring to whole pixels.
pub fn text_anchor(
    surface: (u32, u32),
    text_align: TextAlign,
    vertical_align: VerticalAlign,
    line_height: f64,
    line_count: usize,
    offset: DVec2,
) -> IVec2 {
    let width = f64::from(surface.0);
    let height = f64::from(surface.1);
    let extra_lines = line_count.saturating_sub(1) as f64;

    let x = match text_align {
        TextAlign::Left => 0.0,
        TextAlign::Right => width,
        TextAlign::Center => (width / 2.0).floor(),
    };
    let y = match vertical_align {
        VerticalAlign::Top => 0.0,
        VerticalAlign::Bottom => (height - line_height * extra_lines).floor(),
        VerticalAlign::Middle => ((height - line_height * extra_lines) / 2.0).floor(),
    };

    IVec2::new(
        x as i32 + (offset.x * width).floor() as i32,
        y as i32 + (offset.y * height).floor() as i32,
    )
}

/// Baseline positions of every line, starting at `anchor`.
pub fn line_positions(anchor: IVec2, line_height: f64, line_count: usize) -> Vec<Vec2> {
    (0..line_count)
        .map(|index| {
            let y = f64::from(anchor.y) + index as f64 * line_height;
            Vec2::new(anchor.x as f32, y as f32)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_single_line_sits_in_the_middle() {
        let anchor = text_anchor(
            (512, 512),
            TextAlign::Center,
            VerticalAlign::Middle,
            60.0,
            1,
            DVec2::ZERO,
        );
        assert_eq!(anchor, IVec2::new(256, 256));
    }

    #[test]
    fn bottom_alignment_lifts_multi_line_blocks() {
        let anchor = text_anchor(
            (256, 256),
            TextAlign::Right,
            VerticalAlign::Bottom,
            30.0,
            3,
            DVec2::ZERO,
        );
        assert_eq!(anchor, IVec2::new(256, 196));

        let middle = text_anchor(
            (256, 256),
            TextAlign::Left,
            VerticalAlign::Middle,
            25.0,
            2,
            DVec2::ZERO,
        );
        // (256 - 25) / 2 = 115.5
        assert_eq!(middle, IVec2::new(0, 115));
    }

    #[test]
    fn offset_is_scaled_by_surface_size() {
        let anchor = text_anchor(
            (512, 256),
            TextAlign::Left,
            VerticalAlign::Top,
            60.0,
            1,
            DVec2::new(0.1, 0.5),
        );
        // 0.1 * 512 = 51.2
        assert_eq!(anchor, IVec2::new(51, 128));
    }

    #[test]
    fn fractional_line_heights_floor_like_a_browser() {
        // 14 * 1.2 = 16.8; 256 - 16.8 * 10 = 88 exactly in double precision.
        let line_height = 14.0 * 1.2;
        let middle = text_anchor(
            (256, 256),
            TextAlign::Center,
            VerticalAlign::Middle,
            line_height,
            11,
            DVec2::ZERO,
        );
        assert_eq!(middle, IVec2::new(128, 44));
        let bottom = text_anchor(
            (256, 256),
            TextAlign::Center,
            VerticalAlign::Bottom,
            line_height,
            11,
            DVec2::ZERO,
        );
        assert_eq!(bottom, IVec2::new(128, 88));
    }

    #[test]
    fn offsets_do_not_lose_a_pixel_to_rounding() {
        let anchor = text_anchor(
            (1000, 1000),
            TextAlign::Left,
            VerticalAlign::Top,
            60.0,
            1,
            DVec2::new(0.7, 0.3),
        );
        assert_eq!(anchor, IVec2::new(700, 300));
    }

    #[test]
    fn lines_step_by_line_height() {
        let positions = line_positions(IVec2::new(10, 20), 12.5, 3);
        assert_eq!(
            positions,
            vec![Vec2::new(10.0, 20.0), Vec2::new(10.0, 32.5), Vec2::new(10.0, 45.0)]
        );
    }
}
