// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

//! File I/O for loading speed fields and saving distance buffers.
//!
//! Distance and speed buffers use the axis-0-fastest layout of the solver
//! core, which is exactly MATLAB's column-major convention, so MAT data
//! passes through unchanged; `.npy` arrays are written in Fortran order
//! and converted on read when necessary.

use std::io::Write;
use std::path::Path;

use ndarray::{ArrayD, IxDyn, ShapeBuilder};

use crate::error::{EikonalError, Result};

/// Supported file formats for field I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// NumPy .npy format.
    Npy,
    /// MATLAB .mat format (Level 5).
    Mat,
}

/// Infer file format from extension.
pub fn infer_format(path: &Path) -> Result<FileFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("npy") => Ok(FileFormat::Npy),
        Some("mat") => Ok(FileFormat::Mat),
        Some(ext) => Err(EikonalError::UnsupportedFileFormat(ext.to_string())),
        None => Err(EikonalError::UnsupportedFileFormat(
            "(no extension)".to_string(),
        )),
    }
}

/// Load a scalar field from a .npy file into the solver buffer layout.
///
/// Accepts f64 data, or f32 promoted to f64. The array shape must equal
/// `expected_shape`.
pub fn load_npy_field(path: &Path, expected_shape: &[usize]) -> Result<Vec<f64>> {
    let arr: ArrayD<f64> = match ndarray_npy::read_npy(path) {
        Ok(a) => a,
        Err(_) => {
            let arr32: ArrayD<f32> = ndarray_npy::read_npy(path)
                .map_err(|e| EikonalError::UnsupportedDtype(format!("{}", e)))?;
            arr32.mapv(|v| v as f64)
        }
    };

    let got_shape: Vec<usize> = arr.shape().to_vec();
    if got_shape != expected_shape {
        return Err(EikonalError::ShapeMismatch {
            expected: expected_shape.to_vec(),
            got: got_shape,
        });
    }

    // Fortran order of the original shape is the standard layout of the
    // axes-reversed view; this also normalizes C-ordered input files.
    Ok(arr
        .reversed_axes()
        .as_standard_layout()
        .to_owned()
        .into_raw_vec())
}

/// Save a scalar field to a .npy file.
///
/// The array is written in Fortran order, matching the buffer layout, so
/// no element shuffling happens on the way out.
pub fn save_npy(shape: &[usize], data: &[f64], path: &Path) -> Result<()> {
    let arr = ArrayD::from_shape_vec(IxDyn(shape).f(), data.to_vec())
        .map_err(|e| EikonalError::Other(format!("shape error: {}", e)))?;
    ndarray_npy::write_npy(path, &arr)
        .map_err(|e| EikonalError::Other(format!("npy write error: {}", e)))?;
    Ok(())
}

/// Load a named variable from a .mat file into the solver buffer layout.
///
/// MAT data is column-major; when the stored dimensions equal
/// `expected_shape` the values pass through unchanged. Dimensions stored
/// reversed (row-major convention) are transposed on load.
pub fn load_mat_field(
    path: &Path,
    variable_name: &str,
    expected_shape: &[usize],
) -> Result<Vec<f64>> {
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    let mat = matfile::MatFile::parse(&mut reader)
        .map_err(|e| EikonalError::Other(format!("MAT parse error: {}", e)))?;

    let available: Vec<String> = mat.arrays().iter().map(|a| a.name().to_string()).collect();
    let array = mat
        .find_by_name(variable_name)
        .ok_or_else(|| EikonalError::MatVariableNotFound {
            expected: variable_name.to_string(),
            available,
        })?;

    let data: Vec<f64> = match array.data() {
        matfile::NumericData::Double { real, imag: _ } => real.clone(),
        matfile::NumericData::Single { real, imag: _ } => {
            real.iter().map(|&v| v as f64).collect()
        }
        _ => {
            return Err(EikonalError::UnsupportedDtype(
                "MAT file array is not f64 or f32".to_string(),
            ))
        }
    };

    let mat_shape: Vec<usize> = array.size().to_vec();
    let num_elements: usize = expected_shape.iter().product();
    if data.len() != num_elements {
        return Err(EikonalError::ShapeMismatch {
            expected: expected_shape.to_vec(),
            got: mat_shape,
        });
    }

    if mat_shape == expected_shape {
        // Column-major with matching dims is already the buffer layout.
        return Ok(data);
    }

    let reversed: Vec<usize> = expected_shape.iter().rev().cloned().collect();
    if mat_shape != reversed {
        return Err(EikonalError::ShapeMismatch {
            expected: expected_shape.to_vec(),
            got: mat_shape,
        });
    }

    // Reversed dims: the column-major file data is C-ordered for the
    // expected shape; transpose into the buffer layout.
    let arr = ArrayD::from_shape_vec(IxDyn(expected_shape), data)
        .map_err(|e| EikonalError::Other(format!("shape error: {}", e)))?;
    Ok(arr
        .reversed_axes()
        .as_standard_layout()
        .to_owned()
        .into_raw_vec())
}

/// Save a scalar field to a .mat file (Level 5 format) under `var_name`.
///
/// The buffer layout is column-major already, so the data is written
/// verbatim with the grid shape as the MAT dimensions.
pub fn save_mat(shape: &[usize], data: &[f64], path: &Path, var_name: &str) -> Result<()> {
    write_mat_level5(path, var_name, shape, data)
}

/// Minimal MAT-file Level 5 writer for a single real f64 array.
///
/// # Why Hand-Rolled?
///
/// The `matfile` crate (v0.5) used for reading MAT files does not support
/// writing. Its feature roadmap explicitly lists "Writing .mat files" as
/// planned but not yet implemented. Therefore, this function implements a
/// minimal MAT-File Level 5 writer to enable saving distance fields in
/// MATLAB-compatible format.
///
/// # Limitations
///
/// - **No compression**: Files are written uncompressed only
/// - **Single array per file**: Only one numeric array can be saved per file
/// - **Level 5 format only**: Does not support newer Level 7/7.3 formats
/// - **Numeric arrays only**: No support for cell arrays, structures, or sparse matrices
/// - **Real data only**: No support for complex numbers
///
/// # Format Details
///
/// This implementation follows the MAT-File Level 5 specification, which
/// uses a binary format consisting of:
/// 1. A 128-byte header identifying the file as MAT-File format
/// 2. A series of data elements, each containing a type/size tag followed by data
///
/// Here that series is a single uncompressed miMATRIX element holding four
/// sub-elements (array flags, dimensions, name, real data), each padded to
/// an 8-byte boundary. The data is stored in column-major (Fortran) order
/// to match MATLAB's convention, which is also the solver buffer layout.
///
/// # Reference
///
/// MAT-File Format documentation:
/// <https://www.mathworks.com/help/pdf_doc/matlab/matfile_format.pdf>
fn write_mat_level5(path: &Path, var_name: &str, dimensions: &[usize], data: &[f64]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut w = std::io::BufWriter::new(file);

    // Header: 116 bytes of text, 8 unused bytes, version, endian tag.
    let desc = b"MATLAB 5.0 MAT-file, created by eikonal-fmm";
    let mut header_text = [b' '; 116];
    header_text[..desc.len()].copy_from_slice(desc);
    w.write_all(&header_text)?;
    w.write_all(&[0u8; 8])?;
    w.write_all(&0x0100u16.to_le_bytes())?;
    w.write_all(b"IM")?;

    let padded = |bytes: u32| bytes.div_ceil(8) * 8;

    let dims_bytes = (dimensions.len() * 4) as u32;
    let name_bytes = var_name.len() as u32;
    let data_bytes = (data.len() * 8) as u32;

    // miMATRIX tag: total size of the four padded sub-elements.
    let matrix_bytes = 16 + (8 + padded(dims_bytes)) + (8 + padded(name_bytes)) + (8 + padded(data_bytes));
    w.write_all(&14u32.to_le_bytes())?;
    w.write_all(&matrix_bytes.to_le_bytes())?;

    // Array flags: miUINT32 pair, class mxDOUBLE_CLASS (6), no flags.
    w.write_all(&6u32.to_le_bytes())?;
    w.write_all(&8u32.to_le_bytes())?;
    w.write_all(&6u32.to_le_bytes())?;
    w.write_all(&0u32.to_le_bytes())?;

    // Dimensions: miINT32 array.
    w.write_all(&5u32.to_le_bytes())?;
    w.write_all(&dims_bytes.to_le_bytes())?;
    for &d in dimensions {
        w.write_all(&(d as i32).to_le_bytes())?;
    }
    w.write_all(&vec![0u8; (padded(dims_bytes) - dims_bytes) as usize])?;

    // Name: miINT8 bytes.
    w.write_all(&1u32.to_le_bytes())?;
    w.write_all(&name_bytes.to_le_bytes())?;
    w.write_all(var_name.as_bytes())?;
    w.write_all(&vec![0u8; (padded(name_bytes) - name_bytes) as usize])?;

    // Real part: miDOUBLE values, column-major.
    w.write_all(&9u32.to_le_bytes())?;
    w.write_all(&data_bytes.to_le_bytes())?;
    for &v in data {
        w.write_all(&v.to_le_bytes())?;
    }
    w.write_all(&vec![0u8; (padded(data_bytes) - data_bytes) as usize])?;

    w.flush()?;
    Ok(())
}

/// Convert a slowness field to speed (element-wise 1/f).
pub fn slowness_to_speed(slowness: &[f64]) -> Result<Vec<f64>> {
    let mut speed = Vec::with_capacity(slowness.len());
    for (index, &value) in slowness.iter().enumerate() {
        if !value.is_finite() || value <= 0.0 {
            return Err(EikonalError::InvalidSlowness { index, value });
        }
        speed.push(1.0 / value);
    }
    Ok(speed)
}

/// Load a speed field from a file, inferring format from extension.
/// MAT files are expected to hold a variable named `speed`.
pub fn load_speed(path: &Path, expected_shape: &[usize]) -> Result<Vec<f64>> {
    match infer_format(path)? {
        FileFormat::Npy => load_npy_field(path, expected_shape),
        FileFormat::Mat => load_mat_field(path, "speed", expected_shape),
    }
}

/// Load a slowness field from a file and convert it to speed.
/// MAT files are expected to hold a variable named `slowness`.
pub fn load_slowness_as_speed(path: &Path, expected_shape: &[usize]) -> Result<Vec<f64>> {
    let slowness = match infer_format(path)? {
        FileFormat::Npy => load_npy_field(path, expected_shape)?,
        FileFormat::Mat => load_mat_field(path, "slowness", expected_shape)?,
    };
    slowness_to_speed(&slowness)
}

/// Save a distance buffer to a file, inferring format from extension.
pub fn save_distance(shape: &[usize], data: &[f64], path: &Path) -> Result<()> {
    match infer_format(path)? {
        FileFormat::Npy => save_npy(shape, data, path),
        FileFormat::Mat => save_mat(shape, data, path, "distance"),
    }
}
