use async_trait::async_trait;
use sqlx::PgPool;

use linea_core::{
    AssetId, ConfidenceTier, DataSourceId, EdgeDetails, EdgeKind, Error, LineageEdge, Result,
    validate_edges,
};

use crate::store::GraphStore;

/// Graph store over the `lineage_edges` table.
///
/// Expected shape:
///
/// ```sql
/// create table lineage_edges (
///   id bigserial primary key,
///   data_source_id bigint not null,
///   from_asset_id bigint not null,
///   to_asset_id bigint not null,
///   from_column text,
///   to_column text,
///   kind text not null,
///   score smallint not null,
///   tier text not null,
///   details text not null,
///   is_manual boolean not null default false
/// );
/// ```
#[derive(Debug, Clone)]
pub struct PostgresGraphStore {
    pool: PgPool,
}

impl PostgresGraphStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GraphStore for PostgresGraphStore {
    async fn replace_discovered(
        &self,
        data_source_id: DataSourceId,
        edges: &[LineageEdge],
    ) -> Result<()> {
        validate_edges(edges)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| Error::Db(err.to_string()))?;

        sqlx::query("delete from lineage_edges where data_source_id = $1 and is_manual = false")
            .bind(data_source_id)
            .execute(&mut *tx)
            .await
            .map_err(|err| Error::Db(err.to_string()))?;

        for edge in edges {
            let details = serde_json::to_string(&edge.details)
                .map_err(|err| Error::Other(format!("serialize edge details: {err}")))?;
            sqlx::query(
                r#"
                insert into lineage_edges
                  (data_source_id, from_asset_id, to_asset_id, from_column, to_column,
                   kind, score, tier, details, is_manual)
                values ($1, $2, $3, $4, $5, $6, $7, $8, $9, false)
                "#,
            )
            .bind(data_source_id)
            .bind(edge.from_asset_id)
            .bind(edge.to_asset_id)
            .bind(edge.from_column.as_deref())
            .bind(edge.to_column.as_deref())
            .bind(edge.kind.as_str())
            .bind(edge.score as i16)
            .bind(edge.tier.as_str())
            .bind(details)
            .execute(&mut *tx)
            .await
            .map_err(|err| Error::Db(err.to_string()))?;
        }

        tx.commit().await.map_err(|err| Error::Db(err.to_string()))
    }

    async fn get_upstream(&self, asset_id: AssetId) -> Result<Vec<LineageEdge>> {
        fetch_edges(&self.pool, "from_asset_id = $1", asset_id).await
    }

    async fn get_downstream(&self, asset_id: AssetId) -> Result<Vec<LineageEdge>> {
        fetch_edges(&self.pool, "to_asset_id = $1", asset_id).await
    }

    async fn get_graph(&self, data_source_id: DataSourceId) -> Result<Vec<LineageEdge>> {
        fetch_edges(&self.pool, "data_source_id = $1", data_source_id).await
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EdgeRow {
    from_asset_id: i64,
    to_asset_id: i64,
    from_column: Option<String>,
    to_column: Option<String>,
    kind: String,
    score: i16,
    tier: String,
    details: String,
}

async fn fetch_edges(pool: &PgPool, filter: &str, bind: i64) -> Result<Vec<LineageEdge>> {
    let sql = format!(
        "select from_asset_id, to_asset_id, from_column, to_column, kind, score, tier, details \
         from lineage_edges where {filter} \
         order by from_asset_id, to_asset_id, from_column"
    );
    let rows = sqlx::query_as::<_, EdgeRow>(&sql)
        .bind(bind)
        .fetch_all(pool)
        .await
        .map_err(|err| Error::Db(err.to_string()))?;

    rows.into_iter().map(map_edge).collect()
}

fn map_edge(row: EdgeRow) -> Result<LineageEdge> {
    let kind = kind_from_str(&row.kind)?;
    let tier = tier_from_str(&row.tier)?;
    let details: EdgeDetails = serde_json::from_str(&row.details)
        .map_err(|err| Error::Db(format!("corrupt edge details: {err}")))?;

    Ok(LineageEdge {
        from_asset_id: row.from_asset_id,
        to_asset_id: row.to_asset_id,
        from_column: row.from_column,
        to_column: row.to_column,
        kind,
        score: row.score.clamp(0, 100) as u8,
        tier,
        details,
    })
}

fn kind_from_str(text: &str) -> Result<EdgeKind> {
    match text {
        "database_fk" => Ok(EdgeKind::DatabaseFk),
        "view_source" => Ok(EdgeKind::ViewSource),
        "smart_fk" => Ok(EdgeKind::SmartFk),
        "semantic_match" => Ok(EdgeKind::SemanticMatch),
        "cardinality_match" => Ok(EdgeKind::CardinalityMatch),
        other => Err(Error::Db(format!("unknown edge kind '{other}'"))),
    }
}

fn tier_from_str(text: &str) -> Result<ConfidenceTier> {
    match text {
        "absolute" => Ok(ConfidenceTier::Absolute),
        "high" => Ok(ConfidenceTier::High),
        "medium" => Ok(ConfidenceTier::Medium),
        "low" => Ok(ConfidenceTier::Low),
        other => Err(Error::Db(format!("unknown confidence tier '{other}'"))),
    }
}
