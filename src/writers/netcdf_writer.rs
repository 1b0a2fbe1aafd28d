use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::models::Dataset;

/// Serializes an in-memory dataset to a netCDF file in one shot.
#[derive(Debug, Default)]
pub struct NetcdfWriter;

impl NetcdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write the dataset to `path`. A failure part-way through removes the
    /// partial file, so a failed conversion never leaves an output artifact.
    pub fn write(&self, dataset: &Dataset, path: &Path) -> Result<()> {
        match self.write_inner(dataset, path) {
            Ok(()) => Ok(()),
            Err(e) => {
                let _ = fs::remove_file(path);
                Err(e)
            }
        }
    }

    fn write_inner(&self, dataset: &Dataset, path: &Path) -> Result<()> {
        let mut file = netcdf::create(path)?;

        for (name, len) in dataset.dims() {
            file.add_dimension(name, len)?;
        }

        for (name, value) in dataset.attrs() {
            file.add_attribute(name, value.as_str())?;
        }

        for (name, var) in dataset.coords().chain(dataset.data_vars()) {
            let dims: Vec<&str> = var.dims.iter().map(String::as_str).collect();
            let mut nc_var = file.add_variable::<f64>(name, &dims)?;
            nc_var.set_fill_value(f64::NAN)?;
            for (attr, value) in &var.attrs {
                nc_var.put_attribute(attr.as_str(), value.as_str())?;
            }
            nc_var.put_values(&var.values, ..)?;
        }

        Ok(())
    }
}
