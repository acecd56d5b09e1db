// ABOUTME: Table lock handling on the live session and in the emitted script
// ABOUTME: Read locks keep a table stable while it is counted and scanned

use super::query;
use crate::error::{DumpError, Result};
use crate::source::SourceConnection;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Proof that the session holds a read lock on one table.
///
/// MySQL table locks belong to the session, so the lock must be released on
/// the same connection it was taken on. Call [`release`](Self::release) once
/// the table's data has been read.
///
/// Dropping the guard does not unlock. When a run aborts between acquire and
/// release, the lock is freed only when the session itself is closed.
#[derive(Debug)]
#[must_use = "a table lock stays held until released"]
pub struct TableLock {
    table: String,
}

impl TableLock {
    /// Take a read lock on `table`, then flush it
    ///
    /// A failed lock is fatal. A failed flush is only logged: the lock alone
    /// already gives a stable snapshot.
    pub async fn acquire<C>(conn: &mut C, table: &str) -> Result<Self>
    where
        C: SourceConnection + ?Sized,
    {
        let lock = query::lock_table_read(table);
        conn.exec(&lock)
            .await
            .map_err(|e| DumpError::query(lock.as_str(), e))?;
        debug!("Locked table `{}` for reading", table);

        let flush = query::flush_table(table);
        if let Err(e) = conn.exec(&flush).await {
            warn!("Could not flush table `{}`: {}", table, e);
        }

        Ok(Self {
            table: table.to_string(),
        })
    }

    /// Release every lock the session holds
    pub async fn release<C>(self, conn: &mut C) -> Result<()>
    where
        C: SourceConnection + ?Sized,
    {
        conn.exec(query::UNLOCK_TABLES)
            .await
            .map_err(|e| DumpError::query(query::UNLOCK_TABLES, e))?;
        debug!("Unlocked table `{}`", self.table);
        Ok(())
    }
}

/// Emit `LOCK TABLES `t` WRITE;` so the restore holds the table while loading
pub async fn write_lock_line<W>(writer: &mut W, table: &str) -> Result<()>
where
    W: AsyncWrite + Unpin + Send + ?Sized,
{
    let line = format!("{};\n", query::lock_table_write(table));
    writer.write_all(line.as_bytes()).await?;
    Ok(())
}

pub async fn write_unlock_line<W>(writer: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin + Send + ?Sized,
{
    writer
        .write_all(format!("{};\n", query::UNLOCK_TABLES).as_bytes())
        .await?;
    Ok(())
}
