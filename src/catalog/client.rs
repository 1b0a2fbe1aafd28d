use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::Result;
use crate::models::SourceFileRecord;

/// Source days with no matching output record, oldest first. The catalog is
/// the only dedup mechanism; the driver never checks file existence itself.
const PENDING_QUERY: &str = "\
SELECT lidar_csv.site, lidar_csv.date, lidar_csv.scan, lidar_csv.whole, \
       lidar_csv.wind, lidar_csv.radial \
FROM lidar_csv \
LEFT JOIN lidar_netcdf \
  ON lidar_csv.site = lidar_netcdf.site AND lidar_csv.date = lidar_netcdf.date \
WHERE lidar_netcdf.netcdf IS NULL \
ORDER BY lidar_csv.date";

/// Read-only client for the file-tracking catalog.
pub struct CatalogClient {
    pool: PgPool,
}

impl CatalogClient {
    /// Connect to the catalog. A connection failure is fatal for the run.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(1).connect(dsn).await?;
        Ok(Self { pool })
    }

    /// Fetch every source record lacking an output record, ordered by date
    /// ascending. No retry, no timeout beyond the driver's defaults.
    pub async fn fetch_pending(&self) -> Result<Vec<SourceFileRecord>> {
        let rows = sqlx::query_as::<
            _,
            (
                String,
                NaiveDate,
                String,
                Option<String>,
                Option<String>,
                Option<String>,
            ),
        >(PENDING_QUERY)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(site, date, scan, whole, wind, radial)| {
                SourceFileRecord::new(site, date, scan, whole, wind, radial)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_query_shape() {
        // the left-join null check is what guarantees exactly-once conversion
        assert!(PENDING_QUERY.contains("LEFT JOIN lidar_netcdf"));
        assert!(PENDING_QUERY.contains("WHERE lidar_netcdf.netcdf IS NULL"));
        assert!(PENDING_QUERY.trim_end().ends_with("ORDER BY lidar_csv.date"));
    }
}
