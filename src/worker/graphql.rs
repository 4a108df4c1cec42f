//! GraphQL wire types for the Uniswap V3 subgraph.
//!
//! Subgraph `BigDecimal`/`BigInt` fields arrive as JSON strings; some
//! gateways return plain numbers. Both are accepted, and null or missing
//! numeric fields decode to `None` so callers can default them to zero.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::QueryFailure;

pub const POOL_24H_QUERY: &str = r#"
    query Pool24h($poolId: ID!, $start: Int!) {
      pool(id: $poolId) { id feeTier totalValueLockedUSD }
      poolHourDatas(
        where: { pool: $poolId, periodStartUnix_gte: $start }
        orderBy: periodStartUnix, orderDirection: asc
      ) { periodStartUnix volumeUSD tvlUSD }
    }"#;

#[derive(Debug, Serialize)]
pub struct GraphQLRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool24hVariables {
    pub pool_id: String,
    pub start: i64,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Pool24hData {
    #[serde(default)]
    pub pool: Option<PoolMeta>,
    #[serde(default, rename = "poolHourDatas")]
    pub pool_hour_datas: Option<Vec<PoolHourData>>,
}

#[derive(Debug, Deserialize)]
pub struct PoolMeta {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "feeTier", deserialize_with = "opt_string")]
    pub fee_tier: Option<String>,
    #[serde(default, rename = "totalValueLockedUSD", deserialize_with = "opt_f64")]
    pub total_value_locked_usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PoolHourData {
    #[serde(default, rename = "periodStartUnix", deserialize_with = "opt_i64")]
    pub period_start_unix: Option<i64>,
    #[serde(default, rename = "volumeUSD", deserialize_with = "opt_f64")]
    pub volume_usd: Option<f64>,
    #[serde(default, rename = "tvlUSD", deserialize_with = "opt_f64")]
    pub tvl_usd: Option<f64>,
}

/// Decodes a GraphQL response body.
///
/// Any `errors` member fails the query, even when `data` is also present.
pub fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T, QueryFailure> {
    let response: GraphQLResponse<T> =
        serde_json::from_str(body).map_err(|e| QueryFailure::Decode(e.to_string()))?;

    if let Some(errors) = response.errors.filter(|e| !e.is_null()) {
        return Err(QueryFailure::Graph(errors.to_string()));
    }

    response
        .data
        .ok_or_else(|| QueryFailure::Decode("response has no data".to_string()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

fn opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Int(n)) => Ok(Some(n as f64)),
        Some(Scalar::Float(n)) => Ok(Some(n)),
        Some(Scalar::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid decimal {s:?}"))),
    }
}

fn opt_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Int(n)) => Ok(Some(n)),
        Some(Scalar::Float(n)) => Ok(Some(n as i64)),
        Some(Scalar::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid integer {s:?}"))),
    }
}

fn opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None => None,
        Some(Scalar::Int(n)) => Some(n.to_string()),
        Some(Scalar::Float(n)) => Some(n.to_string()),
        Some(Scalar::Text(s)) => Some(s),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_string_encoded_numbers() {
        let body = r#"{
            "data": {
                "pool": { "id": "0xd0b5", "feeTier": "500", "totalValueLockedUSD": "123456.78" },
                "poolHourDatas": [
                    { "periodStartUnix": 1760770800, "volumeUSD": "100.5", "tvlUSD": "1000" },
                    { "periodStartUnix": "1760774400", "volumeUSD": 50, "tvlUSD": 2000.25 }
                ]
            }
        }"#;

        let data: Pool24hData = parse_response(body).unwrap();
        let pool = data.pool.unwrap();
        assert_eq!(pool.fee_tier.as_deref(), Some("500"));
        assert_eq!(pool.total_value_locked_usd, Some(123456.78));

        let hours = data.pool_hour_datas.unwrap();
        assert_eq!(hours.len(), 2);
        assert_eq!(hours[0].period_start_unix, Some(1760770800));
        assert_eq!(hours[0].volume_usd, Some(100.5));
        assert_eq!(hours[1].period_start_unix, Some(1760774400));
        assert_eq!(hours[1].volume_usd, Some(50.0));
        assert_eq!(hours[1].tvl_usd, Some(2000.25));
    }

    #[test]
    fn test_null_and_missing_fields_decode_to_none() {
        let body = r#"{
            "data": {
                "pool": { "id": "0xd0b5", "feeTier": 3000, "totalValueLockedUSD": null },
                "poolHourDatas": [ { "periodStartUnix": 1760770800 } ]
            }
        }"#;

        let data: Pool24hData = parse_response(body).unwrap();
        let pool = data.pool.unwrap();
        assert_eq!(pool.fee_tier.as_deref(), Some("3000"));
        assert_eq!(pool.total_value_locked_usd, None);

        let hours = data.pool_hour_datas.unwrap();
        assert_eq!(hours[0].volume_usd, None);
        assert_eq!(hours[0].tvl_usd, None);
    }

    #[test]
    fn test_unknown_pool() {
        let body = r#"{ "data": { "pool": null, "poolHourDatas": [] } }"#;
        let data: Pool24hData = parse_response(body).unwrap();
        assert!(data.pool.is_none());
        assert!(data.pool_hour_datas.unwrap().is_empty());
    }

    #[test]
    fn test_graphql_errors_fail_the_query() {
        let body = r#"{
            "data": null,
            "errors": [ { "message": "indexing_error" } ]
        }"#;
        match parse_response::<Pool24hData>(body) {
            Err(QueryFailure::Graph(errors)) => assert!(errors.contains("indexing_error")),
            other => panic!("expected Graph error, got {other:?}"),
        }

        let partial = r#"{ "data": { "pool": null }, "errors": [] }"#;
        assert!(matches!(
            parse_response::<Pool24hData>(partial),
            Err(QueryFailure::Graph(_))
        ));
    }

    #[test]
    fn test_invalid_bodies_are_decode_failures() {
        assert!(matches!(
            parse_response::<Pool24hData>("<html>bad gateway</html>"),
            Err(QueryFailure::Decode(_))
        ));
        assert!(matches!(
            parse_response::<Pool24hData>(r#"{ "data": null }"#),
            Err(QueryFailure::Decode(_))
        ));
        assert!(matches!(
            parse_response::<Pool24hData>(
                r#"{ "data": { "poolHourDatas": [ { "volumeUSD": "abc" } ] } }"#
            ),
            Err(QueryFailure::Decode(_))
        ));
    }

    #[test]
    fn test_request_serialization() {
        let request = GraphQLRequest {
            query: POOL_24H_QUERY,
            variables: Pool24hVariables {
                pool_id: "0xd0b5".to_string(),
                start: 1760700000,
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["variables"]["poolId"], "0xd0b5");
        assert_eq!(value["variables"]["start"], 1760700000);
        assert!(value["query"].as_str().unwrap().contains("poolHourDatas"));
    }
}
