use http::Method;
use http::header::HeaderName;
use quill_config::{AnyOrArray, CorsConfig};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Build a Tower CORS layer from configuration
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_origin(origins(&config.origins))
        .allow_methods(methods(&config.methods))
        .allow_headers(headers(&config.headers));

    // tower-http rejects credentials combined with any wildcard
    let explicit = [&config.origins, &config.methods, &config.headers]
        .iter()
        .all(|value| matches!(value, AnyOrArray::List(_)));

    let layer = if config.credentials && explicit {
        layer.allow_credentials(true)
    } else {
        if config.credentials {
            tracing::warn!("ignoring cors.credentials: origins, methods and headers must be explicit lists");
        }
        layer
    };

    match config.max_age_duration() {
        Some(duration) => layer.max_age(duration),
        None => layer,
    }
}

fn origins(config: &AnyOrArray) -> AllowOrigin {
    match config {
        AnyOrArray::Any => AllowOrigin::any(),
        AnyOrArray::List(origins) => AllowOrigin::list(origins.iter().filter_map(|o| o.parse().ok())),
    }
}

fn methods(config: &AnyOrArray) -> AllowMethods {
    match config {
        AnyOrArray::Any => AllowMethods::any(),
        AnyOrArray::List(methods) => AllowMethods::list(methods.iter().filter_map(|m| m.parse::<Method>().ok())),
    }
}

fn headers(config: &AnyOrArray) -> AllowHeaders {
    match config {
        AnyOrArray::Any => AllowHeaders::any(),
        AnyOrArray::List(headers) => AllowHeaders::list(headers.iter().filter_map(|h| h.parse::<HeaderName>().ok())),
    }
}
