// Host-side tests for surface format selection.

use motes_render::pick_surface_format;
use wgpu::TextureFormat;

#[test]
fn srgb_format_is_preferred() {
    let formats = [
        TextureFormat::Bgra8Unorm,
        TextureFormat::Rgba16Float,
        TextureFormat::Bgra8UnormSrgb,
    ];
    assert_eq!(
        pick_surface_format(&formats),
        Some(TextureFormat::Bgra8UnormSrgb)
    );
}

#[test]
fn first_format_is_used_without_srgb() {
    let formats = [TextureFormat::Rgba8Unorm, TextureFormat::Bgra8Unorm];
    assert_eq!(pick_surface_format(&formats), Some(TextureFormat::Rgba8Unorm));
}

#[test]
fn no_formats_gives_none() {
    assert_eq!(pick_surface_format(&[]), None);
}
