//! Dose and mask volumes as raw little-endian `f32`, x fastest

use std::fs::File;
use std::io::{Write, Read, BufWriter, BufReader};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{BoxDim, Volume};

type IORes<T> = std::io::Result<T>;

pub fn write(data: impl Iterator<Item = f32>, path: &Path) -> IORes<()> {
    let file = File::create(path)?;
    let mut buf = BufWriter::new(file);
    for datum in data {
        buf.write_all(&datum.to_le_bytes())?;
    }
    buf.flush()
}

pub fn read<'a>(path: &Path) -> IORes<impl Iterator<Item = IORes<f32>> + 'a> {
    let file = File::open(path)?;
    let mut buf = BufReader::new(file);
    let mut buffer = [0; 4];

    Ok(std::iter::from_fn(move || {
        use std::io::ErrorKind::UnexpectedEof;
        match buf.read_exact(&mut buffer) {
            Ok(()) => Some(Ok(f32::from_le_bytes(buffer))),
            Err(e) if e.kind() == UnexpectedEof => None,
            Err(e) => Some(Err(e)),
        }
    }))
}

/// Write `volume` with the x index varying fastest
pub fn write_volume(volume: &Volume<f64>, path: &Path) -> IORes<()> {
    // Fortran order: permute the axes so that logical iteration visits x fastest
    write(volume.t().iter().map(|&v| v as f32), path)
}

/// Read a volume of shape `[nx, ny, nz]` written by `write_volume`
pub fn read_volume(path: &Path, [nx, ny, nz]: BoxDim) -> Result<Volume<f64>> {
    let data = read(path)?
        .map(|r| r.map(f64::from))
        .collect::<IORes<Vec<_>>>()?;
    let expected = nx * ny * nz;
    if data.len() != expected {
        return Err(Error::parse(path, 0, format!("{} values for shape {:?}: expected {expected}",
                                                 data.len(), [nx, ny, nz])));
    }
    // The row-major array of shape [nz, ny, nx], transposed
    let zyx = Volume::from_shape_vec([nz, ny, nx], data)
        .map_err(|e| Error::parse(path, 0, e.to_string()))?;
    Ok(zyx.reversed_axes())
}
