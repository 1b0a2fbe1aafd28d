use std::collections::BTreeMap;

use crate::error::{ConversionError, Result};

/// A single labeled array: dimension names, row-major values, and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub dims: Vec<String>,
    pub values: Vec<f64>,
    pub attrs: BTreeMap<String, String>,
}

impl Variable {
    pub fn new(dims: &[&str], values: Vec<f64>) -> Self {
        Self {
            dims: dims.iter().map(|d| d.to_string()).collect(),
            values,
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }
}

/// In-memory structured dataset produced by the loaders: named dimensions,
/// coordinate variables, data variables, and global attributes. Transient;
/// it only ever leaves memory through the netCDF writer.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    dims: Vec<(String, usize)>,
    coords: BTreeMap<String, Variable>,
    data_vars: BTreeMap<String, Variable>,
    attrs: BTreeMap<String, String>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dimension. Re-registering with the same length is a no-op;
    /// a different length is an error.
    pub fn add_dim(&mut self, name: &str, len: usize) -> Result<()> {
        if let Some((_, existing)) = self.dims.iter().find(|(n, _)| n == name) {
            if *existing != len {
                return Err(ConversionError::DimensionMismatch(format!(
                    "dimension '{}' registered with length {} and {}",
                    name, existing, len
                )));
            }
            return Ok(());
        }
        self.dims.push((name.to_string(), len));
        Ok(())
    }

    pub fn dim_len(&self, name: &str) -> Option<usize> {
        self.dims
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, len)| *len)
    }

    pub fn dims(&self) -> impl Iterator<Item = (&str, usize)> {
        self.dims.iter().map(|(n, len)| (n.as_str(), *len))
    }

    pub fn add_coord(&mut self, name: &str, var: Variable) -> Result<()> {
        self.check_shape(name, &var)?;
        self.coords.insert(name.to_string(), var);
        Ok(())
    }

    pub fn add_var(&mut self, name: &str, var: Variable) -> Result<()> {
        self.check_shape(name, &var)?;
        self.data_vars.insert(name.to_string(), var);
        Ok(())
    }

    fn check_shape(&self, name: &str, var: &Variable) -> Result<()> {
        let mut expected = 1usize;
        for dim in &var.dims {
            let len = self.dim_len(dim).ok_or_else(|| {
                ConversionError::DimensionMismatch(format!(
                    "variable '{}' references unknown dimension '{}'",
                    name, dim
                ))
            })?;
            expected *= len;
        }
        if expected != var.values.len() {
            return Err(ConversionError::DimensionMismatch(format!(
                "variable '{}' has {} values, dimensions imply {}",
                name,
                var.values.len(),
                expected
            )));
        }
        Ok(())
    }

    pub fn coord(&self, name: &str) -> Option<&Variable> {
        self.coords.get(name)
    }

    pub fn var(&self, name: &str) -> Option<&Variable> {
        self.data_vars.get(name)
    }

    pub fn has_var(&self, name: &str) -> bool {
        self.data_vars.contains_key(name)
    }

    pub fn var_names(&self) -> Vec<String> {
        self.data_vars.keys().cloned().collect()
    }

    pub fn coords(&self) -> impl Iterator<Item = (&String, &Variable)> {
        self.coords.iter()
    }

    pub fn data_vars(&self) -> impl Iterator<Item = (&String, &Variable)> {
        self.data_vars.iter()
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attrs.insert(name.to_string(), value.to_string());
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&String, &String)> {
        self.attrs.iter()
    }

    /// Rename a data variable, keeping its values and attributes.
    /// Returns false when the old name is not present.
    pub fn rename_var(&mut self, old: &str, new: &str) -> bool {
        match self.data_vars.remove(old) {
            Some(var) => {
                self.data_vars.insert(new.to_string(), var);
                true
            }
            None => false,
        }
    }

    /// Attach an attribute to an existing data variable, if present.
    pub fn set_var_attr(&mut self, var: &str, name: &str, value: &str) {
        if let Some(v) = self.data_vars.get_mut(var) {
            v.attrs.insert(name.to_string(), value.to_string());
        }
    }

    /// Attach an attribute to a coordinate, only when not already set.
    pub fn set_coord_attr_if_missing(&mut self, coord: &str, name: &str, value: &str) {
        if let Some(v) = self.coords.get_mut(coord) {
            v.attrs
                .entry(name.to_string())
                .or_insert_with(|| value.to_string());
        }
    }

    /// Invalidate the named variables wherever the quality flag is zero.
    ///
    /// A missing flag variable makes this a no-op, as does a missing victim.
    /// The flag either matches a victim element-for-element or spans its
    /// leading dimension, in which case each flag value covers one contiguous
    /// block of the victim.
    pub fn mask_where_flag(&mut self, victims: &[&str], flag: &str) -> Result<()> {
        let flag_values = match self.data_vars.get(flag) {
            Some(v) => v.values.clone(),
            None => return Ok(()),
        };
        for name in victims {
            let Some(victim) = self.data_vars.get_mut(*name) else {
                continue;
            };
            if flag_values.len() == victim.values.len() {
                for (value, ok) in victim.values.iter_mut().zip(&flag_values) {
                    if *ok == 0.0 {
                        *value = f64::NAN;
                    }
                }
            } else if !flag_values.is_empty() && victim.values.len() % flag_values.len() == 0 {
                let block = victim.values.len() / flag_values.len();
                for (i, ok) in flag_values.iter().enumerate() {
                    if *ok == 0.0 {
                        for value in &mut victim.values[i * block..(i + 1) * block] {
                            *value = f64::NAN;
                        }
                    }
                }
            } else {
                return Err(ConversionError::DimensionMismatch(format!(
                    "flag '{}' ({} values) cannot mask '{}' ({} values)",
                    flag,
                    flag_values.len(),
                    name,
                    victim.values.len()
                )));
            }
        }
        Ok(())
    }

    /// Remove every listed variable that exists, silently skipping the rest.
    /// Returns the names actually removed.
    pub fn drop_vars(&mut self, candidates: &[&str]) -> Vec<String> {
        let mut dropped = Vec::new();
        for name in candidates {
            if self.data_vars.remove(*name).is_some() {
                dropped.push(name.to_string());
            }
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grid_dataset() -> Dataset {
        let mut ds = Dataset::new();
        ds.add_dim("time", 2).unwrap();
        ds.add_dim("range", 3).unwrap();
        ds.add_var("CNR", Variable::new(&["time", "range"], vec![1.0; 6]))
            .unwrap();
        ds.add_var("DRWS", Variable::new(&["time", "range"], vec![2.0; 6]))
            .unwrap();
        ds.add_var("RWS", Variable::new(&["time", "range"], vec![3.0; 6]))
            .unwrap();
        ds
    }

    #[test]
    fn test_shape_checked_on_insert() {
        let mut ds = Dataset::new();
        ds.add_dim("time", 2).unwrap();
        let err = ds.add_var("x", Variable::new(&["time"], vec![1.0, 2.0, 3.0]));
        assert!(err.is_err());
        let err = ds.add_var("y", Variable::new(&["height"], vec![1.0]));
        assert!(err.is_err());
    }

    #[test]
    fn test_conflicting_dim_length_rejected() {
        let mut ds = Dataset::new();
        ds.add_dim("time", 2).unwrap();
        assert!(ds.add_dim("time", 2).is_ok());
        assert!(ds.add_dim("time", 5).is_err());
    }

    #[test]
    fn test_mask_elementwise() {
        let mut ds = grid_dataset();
        ds.add_var(
            "Status",
            Variable::new(&["time", "range"], vec![1.0, 0.0, 1.0, 0.0, 1.0, 1.0]),
        )
        .unwrap();

        ds.mask_where_flag(&["CNR", "DRWS"], "Status").unwrap();

        let cnr = &ds.var("CNR").unwrap().values;
        assert!(cnr[1].is_nan() && cnr[3].is_nan());
        assert_eq!(cnr[0], 1.0);
        // untouched variable stays intact
        assert!(ds.var("RWS").unwrap().values.iter().all(|v| *v == 3.0));
    }

    #[test]
    fn test_mask_broadcasts_over_leading_dim() {
        let mut ds = grid_dataset();
        ds.add_var("Status", Variable::new(&["time"], vec![0.0, 1.0]))
            .unwrap();

        ds.mask_where_flag(&["CNR"], "Status").unwrap();

        let cnr = &ds.var("CNR").unwrap().values;
        assert!(cnr[..3].iter().all(|v| v.is_nan()));
        assert!(cnr[3..].iter().all(|v| *v == 1.0));
    }

    #[test]
    fn test_mask_without_flag_is_noop() {
        let mut ds = grid_dataset();
        ds.mask_where_flag(&["CNR", "DRWS"], "Status").unwrap();
        assert!(ds.var("CNR").unwrap().values.iter().all(|v| *v == 1.0));
    }

    #[test]
    fn test_drop_vars_is_set_intersection() {
        let mut ds = grid_dataset();
        let dropped = ds.drop_vars(&["Status", "Error", "Confidence", "RWS"]);
        assert_eq!(dropped, vec!["RWS".to_string()]);
        assert!(ds.has_var("CNR"));
        assert!(!ds.has_var("RWS"));

        // entirely disjoint candidate set never fails
        let dropped = ds.drop_vars(&["Status", "Error"]);
        assert!(dropped.is_empty());
    }

    #[test]
    fn test_rename_var_keeps_attrs() {
        let mut ds = Dataset::new();
        ds.add_dim("time", 1).unwrap();
        ds.add_var("CNR", Variable::new(&["time"], vec![1.0]).with_attr("units", "dB"))
            .unwrap();

        assert!(ds.rename_var("CNR", "cnr"));
        assert!(!ds.rename_var("CNR", "cnr"));
        assert_eq!(ds.var("cnr").unwrap().attrs.get("units").unwrap(), "dB");
    }
}
