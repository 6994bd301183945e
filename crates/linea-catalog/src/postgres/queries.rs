use sqlx::PgPool;

use linea_core::{AssetId, ColumnId, DataSourceId, Error, Result};

use crate::connector::{RawColumnInfo, RawForeignKey};

#[derive(Debug, sqlx::FromRow)]
pub struct AssetRow {
    pub id: i64,
    pub kind: String,
    pub schema_name: String,
    pub name: String,
    pub database: Option<String>,
    pub data_source_id: i64,
}

pub async fn list_assets(pool: &PgPool, data_source_id: DataSourceId) -> Result<Vec<AssetRow>> {
    sqlx::query_as::<_, AssetRow>(
        r#"
        select id, kind, schema_name, name, database, data_source_id
        from data_assets
        where data_source_id = $1
        order by schema_name, name
        "#,
    )
    .bind(data_source_id)
    .fetch_all(pool)
    .await
    .map_err(|err| Error::Db(err.to_string()))
}

#[derive(Debug, sqlx::FromRow)]
pub struct ColumnRow {
    pub id: i64,
    pub asset_id: i64,
    pub name: String,
    pub data_type: String,
    pub ordinal_position: i16,
    pub is_nullable: bool,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub foreign_key_table: Option<String>,
    pub foreign_key_column: Option<String>,
}

pub async fn list_columns(pool: &PgPool, asset_id: AssetId) -> Result<Vec<ColumnRow>> {
    sqlx::query_as::<_, ColumnRow>(
        r#"
        select id, asset_id, name, data_type, ordinal_position, is_nullable,
               is_primary_key, is_foreign_key, foreign_key_table, foreign_key_column
        from asset_columns
        where asset_id = $1
        order by ordinal_position
        "#,
    )
    .bind(asset_id)
    .fetch_all(pool)
    .await
    .map_err(|err| Error::Db(err.to_string()))
}

pub async fn clear_foreign_keys(pool: &PgPool, data_source_id: DataSourceId) -> Result<()> {
    sqlx::query(
        r#"
        update asset_columns
        set is_foreign_key = false, foreign_key_table = null, foreign_key_column = null
        where asset_id in (select id from data_assets where data_source_id = $1)
        "#,
    )
    .bind(data_source_id)
    .execute(pool)
    .await
    .map_err(|err| Error::Db(err.to_string()))?;
    Ok(())
}

pub async fn mark_foreign_key(
    pool: &PgPool,
    column_id: ColumnId,
    to_table: &str,
    to_column: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        update asset_columns
        set is_foreign_key = true, foreign_key_table = $2, foreign_key_column = $3
        where id = $1
        "#,
    )
    .bind(column_id)
    .bind(to_table)
    .bind(to_column)
    .execute(pool)
    .await
    .map_err(|err| Error::Db(err.to_string()))?;
    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct ForeignKeyRow {
    constraint_name: String,
    from_column: String,
    to_table: String,
    to_column: String,
}

pub async fn list_foreign_keys(
    pool: &PgPool,
    schema: &str,
    table: &str,
) -> Result<Vec<RawForeignKey>> {
    let rows = sqlx::query_as::<_, ForeignKeyRow>(
        r#"
        select
          con.conname as constraint_name,
          src_att.attname as from_column,
          ref_rel.relname as to_table,
          ref_att.attname as to_column
        from pg_constraint con
        join pg_class src_rel on src_rel.oid = con.conrelid
        join pg_namespace src_nsp on src_nsp.oid = src_rel.relnamespace
        join pg_class ref_rel on ref_rel.oid = con.confrelid
        join unnest(con.conkey, con.confkey) with ordinality
          as cols(src_attnum, ref_attnum, ordinality) on true
        join pg_attribute src_att
          on src_att.attrelid = con.conrelid and src_att.attnum = cols.src_attnum
        join pg_attribute ref_att
          on ref_att.attrelid = con.confrelid and ref_att.attnum = cols.ref_attnum
        where src_nsp.nspname = $1
          and src_rel.relname = $2
          and con.contype = 'f'
        order by con.conname, cols.ordinality
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(|err| Error::Db(err.to_string()))?;

    Ok(rows
        .into_iter()
        .map(|row| RawForeignKey {
            constraint: Some(row.constraint_name),
            from_column: row.from_column,
            to_table: row.to_table,
            to_column: row.to_column,
        })
        .collect())
}

#[derive(Debug, sqlx::FromRow)]
struct TableColumnRow {
    name: String,
    data_type: String,
    ordinal: i16,
}

pub async fn list_table_columns(
    pool: &PgPool,
    schema: &str,
    table: &str,
) -> Result<Vec<RawColumnInfo>> {
    let rows = sqlx::query_as::<_, TableColumnRow>(
        r#"
        select
          a.attname as name,
          pg_catalog.format_type(a.atttypid, a.atttypmod) as data_type,
          a.attnum as ordinal
        from pg_attribute a
        join pg_class c on c.oid = a.attrelid
        join pg_namespace n on n.oid = c.relnamespace
        where n.nspname = $1
          and c.relname = $2
          and a.attnum > 0
          and not a.attisdropped
        order by a.attnum
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(|err| Error::Db(err.to_string()))?;

    Ok(rows
        .into_iter()
        .map(|row| RawColumnInfo {
            name: row.name,
            data_type: row.data_type,
            ordinal: row.ordinal,
        })
        .collect())
}
