use std::{fs, fs::File, io::BufWriter, path::Path};

use bevlens_image::{Image, ImageSize};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};

use crate::error::IoError;

/// Read a PNG image as three channels (rgb8).
///
/// Palette and low bit-depth images are expanded, 16-bit samples are stripped to 8 bits,
/// grayscale is replicated to the three channels and alpha is dropped.
///
/// # Arguments
///
/// * `file_path` - The path to the PNG file.
///
/// # Returns
///
/// A RGB image with three channels (rgb8).
pub fn read_image_png_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let (buf, size, color_type) = read_png_impl(file_path)?;

    let rgb = match color_type {
        ColorType::Rgb => buf,
        ColorType::Rgba => buf.chunks_exact(4).flat_map(|p| [p[0], p[1], p[2]]).collect(),
        ColorType::Grayscale => buf.iter().flat_map(|&v| [v, v, v]).collect(),
        ColorType::GrayscaleAlpha => buf.chunks_exact(2).flat_map(|p| [p[0], p[0], p[0]]).collect(),
        ColorType::Indexed => {
            return Err(IoError::PngDecodeError(
                "indexed color was not expanded".to_string(),
            ))
        }
    };

    Ok(Image::new(size.into(), rgb)?)
}

// utility function to read the png file
fn read_png_impl(
    file_path: impl AsRef<Path>,
) -> Result<(Vec<u8>, [usize; 2], ColorType), IoError> {
    // verify the file exists
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    // verify the file extension
    match file_path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("png") => {}
        _ => return Err(IoError::InvalidFileExtension(file_path.to_path_buf())),
    }

    let file = fs::File::open(file_path)?;
    let mut decoder = Decoder::new(file);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::PngDecodeError(e.to_string()))?;
    buf.truncate(info.buffer_size());

    Ok((
        buf,
        [info.width as usize, info.height as usize],
        info.color_type,
    ))
}

/// Writes the given PNG _(rgb8)_ data to the given file path.
///
/// Missing parent directories are created and an existing file is overwritten.
///
/// # Arguments
///
/// - `file_path` - The path to the PNG image.
/// - `image` - The image to encode.
pub fn write_image_png_rgb8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 3>,
) -> Result<(), IoError> {
    write_png_impl(
        file_path,
        image.as_slice(),
        image.size(),
        BitDepth::Eight,
        ColorType::Rgb,
    )
}

fn write_png_impl(
    file_path: impl AsRef<Path>,
    image_data: &[u8],
    image_size: ImageSize,
    depth: BitDepth,
    color_type: ColorType,
) -> Result<(), IoError> {
    let file_path = file_path.as_ref();
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = BufWriter::new(File::create(file_path)?);

    let mut encoder = Encoder::new(file, image_size.width as u32, image_size.height as u32);
    encoder.set_color(color_type);
    encoder.set_depth(depth);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    writer
        .write_image_data(image_data)
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
    writer
        .finish()
        .map_err(|e| IoError::PngEncodingError(e.to_string()))?;

    log::debug!("wrote {} to {}", image_size, file_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IoError;

    #[test]
    fn read_write_png_rgb8() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("nested").join("frame.png");

        let data = (0..4 * 3 * 3).map(|v| (v * 7) as u8).collect::<Vec<_>>();
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 4,
                height: 3,
            },
            data,
        )?;
        write_image_png_rgb8(&file_path, &image)?;
        assert!(file_path.exists(), "File does not exist: {:?}", file_path);

        let image_back = read_image_png_rgb8(&file_path)?;
        assert_eq!(image_back, image);

        Ok(())
    }

    #[test]
    fn read_gray_png_as_rgb8() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("mask.png");

        // gray frames written by another tool
        let file = BufWriter::new(File::create(&file_path)?);
        let mut encoder = Encoder::new(file, 2, 1);
        encoder.set_color(ColorType::Grayscale);
        encoder.set_depth(BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
        writer
            .write_image_data(&[10, 200])
            .map_err(|e| IoError::PngEncodingError(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| IoError::PngEncodingError(e.to_string()))?;

        let rgb = read_image_png_rgb8(&file_path)?;
        assert_eq!(rgb.as_slice(), &[10, 10, 10, 200, 200, 200]);

        Ok(())
    }

    #[test]
    fn read_png_errors() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;

        let missing = tmp_dir.path().join("missing.png");
        assert!(matches!(
            read_image_png_rgb8(&missing),
            Err(IoError::FileDoesNotExist(_))
        ));

        let wrong_ext = tmp_dir.path().join("frame.jpg");
        std::fs::write(&wrong_ext, b"not a png")?;
        assert!(matches!(
            read_image_png_rgb8(&wrong_ext),
            Err(IoError::InvalidFileExtension(_))
        ));

        let corrupt = tmp_dir.path().join("corrupt.png");
        std::fs::write(&corrupt, b"not a png")?;
        assert!(matches!(
            read_image_png_rgb8(&corrupt),
            Err(IoError::PngDecodeError(_))
        ));

        Ok(())
    }
}
