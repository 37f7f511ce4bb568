use crate::error::DataAccessError;
use crate::mapping::{PropertyMap, Record, TypeMap};
use crate::results::{Row, RowSet};
use crate::types::{RowValue, Shared};

/// Drives row-to-record materialization for the query command variants.
///
/// A reader either maps columns onto record fields through a [`PropertyMap`]
/// (inferred from the cursor's column names when not configured) or hands the
/// whole row to a caller-supplied callback. A [`TypeMap`] switches creation of
/// new records on a discriminator column.
pub struct TypeReader<T> {
    on_record_read: Option<Box<dyn FnMut(&Row, &mut T) + Send>>,
    property_map: Option<PropertyMap>,
    type_map: Option<TypeMap<T>>,
}

impl<T> Default for TypeReader<T> {
    fn default() -> Self {
        Self {
            on_record_read: None,
            property_map: None,
            type_map: None,
        }
    }
}

impl<T: Record> TypeReader<T> {
    pub fn set_callback(&mut self, callback: impl FnMut(&Row, &mut T) + Send + 'static) {
        self.on_record_read = Some(Box::new(callback));
    }

    pub fn set_property_map(&mut self, map: PropertyMap) {
        self.property_map = Some(map);
    }

    pub fn set_type_map(&mut self, map: TypeMap<T>) {
        self.type_map = Some(map);
    }

    /// Copies one row onto `target`, one mapped field at a time. Fields whose
    /// column is ignored or absent from the cursor are left untouched.
    fn read_record(&mut self, row: &Row, target: &mut T) -> Result<(), DataAccessError> {
        if let Some(callback) = self.on_record_read.as_mut() {
            callback(row, target);
            return Ok(());
        }
        let map = self
            .property_map
            .get_or_insert_with(|| PropertyMap::infer(row.columns()));
        for path in target.paths() {
            if map.is_ignored(path) {
                continue;
            }
            let Some(index) = map.index_of(path) else {
                continue;
            };
            match row.get_by_index(index) {
                Some(RowValue::Null) | None => target.assign(path, RowValue::Null)?,
                Some(value) => target.assign(path, value.clone())?,
            }
        }
        Ok(())
    }

    fn create(&self, row: &Row) -> Result<T, DataAccessError>
    where
        T: Default,
    {
        match &self.type_map {
            Some(map) => map.create(row),
            None => Ok(T::default()),
        }
    }

    /// Reads at most one row. Returns the populated record (reusing `existing`
    /// when given) and the number of rows read.
    pub fn read_single(
        &mut self,
        rows: &RowSet,
        existing: Option<Shared<T>>,
    ) -> Result<(Option<Shared<T>>, i64), DataAccessError>
    where
        T: Default + Send + 'static,
    {
        if rows.len() > 1 {
            return Err(DataAccessError::MoreThanOneRecord);
        }
        let Some(row) = rows.get(0) else {
            return Ok((existing, 0));
        };
        let shared = match existing {
            Some(shared) => shared,
            None => Shared::new(self.create(row)?),
        };
        {
            let mut guard = shared.lock();
            self.read_record(row, &mut guard)?;
        }
        Ok((Some(shared), 1))
    }

    /// Reads every row, updating `records` in place positionally and creating
    /// new records past the end. Returns the resulting collection length, or
    /// zero when the cursor was empty.
    pub fn read_collection(
        &mut self,
        rows: &RowSet,
        records: &mut Vec<T>,
    ) -> Result<i64, DataAccessError>
    where
        T: Default,
    {
        if rows.is_empty() {
            return Ok(0);
        }
        for (position, row) in rows.iter().enumerate() {
            if position < records.len() {
                self.read_record(row, &mut records[position])?;
            } else {
                let mut record = self.create(row)?;
                self.read_record(row, &mut record)?;
                records.push(record);
            }
        }
        Ok(records.len() as i64)
    }
}
