use super::error::FetchError;
use super::records::{
    normalize_live_vehicles, normalize_metro_route, normalize_months, normalize_od_flow,
    normalize_passenger_flow, normalize_route, LiveVehicleRecord, MetroRouteRecord, MonthRecord,
    OdFlowRecord, PassengerFlowRecord, RoutePageRecord, RouteShapeRecord, RouteStopsRecord,
};
use crate::models::{
    EngineSettings, FlowDataset, LiveVehicle, MonthOption, PassengerFlowDataset, RouteShape,
};
use serde::de::DeserializeOwned;

/// Upper bound on followed `next` cursors, in case the backend ever links a page to itself
const MAX_ROUTE_PAGES: usize = 500;

async fn get_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, FetchError> {
    let response = request
        .send()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| FetchError::Decode(e.to_string()))
}

fn get(url: &str) -> reqwest::RequestBuilder {
    reqwest::Client::new().get(url)
}

fn with_month(url: &str, month: &str) -> reqwest::RequestBuilder {
    get(url).query(&[("month", month)])
}

/// Poll the live vehicle feed
///
/// # Errors
///
/// Returns an error if the request fails, the status is not 2xx, or the body cannot be decoded
pub async fn fetch_live_vehicles(settings: &EngineSettings) -> Result<Vec<LiveVehicle>, FetchError> {
    let records: Vec<LiveVehicleRecord> = get_json(get(&settings.url("live-metro/"))).await?;
    Ok(normalize_live_vehicles(records))
}

/// Fetch the months for which OD data exists, oldest first
///
/// # Errors
///
/// Returns an error if the request fails, the status is not 2xx, or the body cannot be decoded
pub async fn fetch_months(settings: &EngineSettings) -> Result<Vec<MonthOption>, FetchError> {
    let records: Vec<MonthRecord> = get_json(get(&settings.url("od-flow/months/"))).await?;
    Ok(normalize_months(records))
}

/// Fetch one month of origin-destination flows
///
/// # Errors
///
/// Returns an error if the request fails, the status is not 2xx, or the body cannot be decoded
pub async fn fetch_od_flow(settings: &EngineSettings, month: &str) -> Result<FlowDataset, FetchError> {
    let record: OdFlowRecord = get_json(with_month(&settings.url("od-flow/"), month)).await?;
    let dataset = normalize_od_flow(Some(month.to_string()), record);
    crate::log!("Loaded {} OD arcs for {}", dataset.arcs().len(), month);
    Ok(dataset)
}

/// Fetch one month of hourly station entries and exits
///
/// # Errors
///
/// Returns an error if the request fails, the status is not 2xx, or the body cannot be decoded
pub async fn fetch_passenger_flow(
    settings: &EngineSettings,
    month: &str,
) -> Result<PassengerFlowDataset, FetchError> {
    let record: PassengerFlowRecord =
        get_json(with_month(&settings.url("passenger-flow/"), month)).await?;
    Ok(normalize_passenger_flow(month, record))
}

/// Fetch metro routes with their embedded polylines and stations
///
/// # Errors
///
/// Returns an error if the request fails, the status is not 2xx, or the body cannot be decoded
pub async fn fetch_metro_routes(settings: &EngineSettings) -> Result<Vec<RouteShape>, FetchError> {
    let records: Vec<MetroRouteRecord> = get_json(get(&settings.url("metro-routes/"))).await?;
    Ok(records.into_iter().map(normalize_metro_route).collect())
}

fn route_resource_url(settings: &EngineSettings, route_id: &str, resource: &str) -> Result<String, FetchError> {
    let mut url = reqwest::Url::parse(&settings.url("routes/"))
        .map_err(|e| FetchError::Invalid(format!("{}: {e}", settings.api_base)))?;
    url.path_segments_mut()
        .map_err(|()| FetchError::Invalid(format!("{} cannot take a path", settings.api_base)))?
        .pop_if_empty()
        .push(route_id)
        .push(resource)
        .push("");
    Ok(url.into())
}

/// Fetch the full route catalog, following `next` cursors, plus each route's shape and stops.
///
/// A failed shape or stops request degrades that route to an empty polyline or stop
/// list; only a failed catalog page fails the whole load.
///
/// # Errors
///
/// Returns an error if a catalog page cannot be fetched or decoded
pub async fn fetch_route_catalog(settings: &EngineSettings) -> Result<Vec<RouteShape>, FetchError> {
    let mut records = Vec::new();
    let mut next = Some(settings.url("routes/"));
    let mut pages = 0;

    while let Some(url) = next.take() {
        pages += 1;
        if pages > MAX_ROUTE_PAGES {
            leptos::logging::warn!("Route catalog exceeded {MAX_ROUTE_PAGES} pages; truncating");
            break;
        }
        let page: RoutePageRecord = get_json(get(&url)).await?;
        records.extend(page.results);
        next = page.next.filter(|n| !n.is_empty() && *n != url);
    }

    let mut routes = Vec::with_capacity(records.len());
    for record in records {
        let shape_url = route_resource_url(settings, &record.route_id, "shape")?;
        let stops_url = route_resource_url(settings, &record.route_id, "stops")?;

        let shape: RouteShapeRecord = get_json(get(&shape_url)).await.unwrap_or_else(|e| {
            leptos::logging::warn!("Shape for route {}: {e}", record.route_id);
            RouteShapeRecord::default()
        });
        let stops: RouteStopsRecord = get_json(get(&stops_url)).await.unwrap_or_else(|e| {
            leptos::logging::warn!("Stops for route {}: {e}", record.route_id);
            RouteStopsRecord::default()
        });

        routes.push(normalize_route(record, shape, stops));
    }

    crate::log!("Loaded {} routes from {} catalog pages", routes.len(), pages);
    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_resource_url_encodes_id() {
        let settings = EngineSettings {
            api_base: "http://127.0.0.1:8000/api".to_string(),
            ..EngineSettings::default()
        };
        let url = route_resource_url(&settings, "R 1/A", "shape").expect("valid url");
        assert_eq!(url, "http://127.0.0.1:8000/api/routes/R%201%2FA/shape/");
    }

    #[test]
    fn test_route_resource_url_needs_absolute_base() {
        let settings = EngineSettings::default();
        assert!(matches!(
            route_resource_url(&settings, "R1", "stops"),
            Err(FetchError::Invalid(_))
        ));
    }
}
