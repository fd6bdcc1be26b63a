//! Command routing.
//!
//! Commands are looked up in a static table mapping each `cmd` name to a
//! handler. Handlers decode their own arguments, call the gateway's checked
//! surface and return the JSON value placed in the success envelope.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use wayfarer_core::{Dispatch, Instance, RouteQuery};
use wayfarer_types::Coordinate;

use super::errors::DispatchError;
use super::request::CommandRequest;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

type CommandHandler = fn(&Instance, &CommandRequest) -> Result<Value, DispatchError>;

/// Commands understood by the loop, in protocol order.
const COMMANDS: &[(&str, CommandHandler)] = &[
    ("geocode", geocode),
    ("plan_route", plan_route),
    ("reverse_geocode", reverse_geocode),
    ("get_tile", get_tile),
    ("get_glyph", get_glyph),
    ("api_get", api_get),
];

/// Names of every supported command.
pub fn command_names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|(name, _)| *name)
}

/// Routes command requests to their handlers.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandRouter;

impl CommandRouter {
    /// Creates a new router.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Executes `request` against `instance`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownCommand`] for unlisted commands and
    /// whatever the handler reports otherwise.
    pub fn route(&self, instance: &Instance, request: &CommandRequest) -> Result<Value, DispatchError> {
        let (_, handler) = COMMANDS
            .iter()
            .find(|(name, _)| *name == request.command())
            .ok_or_else(|| DispatchError::unknown_command(request.command()))?;
        debug!(target: DISPATCH_TARGET, command = request.command(), "routing command");
        handler(instance, request)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeArgs {
    query: String,
}

#[derive(Debug, Deserialize)]
struct PlanRouteArgs {
    from_lat: f64,
    from_lon: f64,
    to_lat: f64,
    to_lon: f64,
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    num_itineraries: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ReverseArgs {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct TileArgs {
    z: i64,
    x: i64,
    y: i64,
}

#[derive(Debug, Deserialize)]
struct PathArgs {
    #[serde(default)]
    path: Option<String>,
}

impl PathArgs {
    fn require(self) -> Result<String, DispatchError> {
        self.path
            .filter(|path| !path.is_empty())
            .ok_or(DispatchError::MissingPath)
    }
}

fn geocode(instance: &Instance, request: &CommandRequest) -> Result<Value, DispatchError> {
    let args: GeocodeArgs = request.arguments("geocode")?;
    Ok(serde_json::to_value(instance.try_geocode(&args.query)?)?)
}

fn plan_route(instance: &Instance, request: &CommandRequest) -> Result<Value, DispatchError> {
    let args: PlanRouteArgs = request.arguments("plan_route")?;
    let query = RouteQuery {
        from: Coordinate::new(args.from_lat, args.from_lon),
        to: Coordinate::new(args.to_lat, args.to_lon),
        departure_time: args.time,
        max_itineraries: args.num_itineraries,
    };
    Ok(serde_json::to_value(instance.try_plan_route(&query)?)?)
}

fn reverse_geocode(instance: &Instance, request: &CommandRequest) -> Result<Value, DispatchError> {
    let args: ReverseArgs = request.arguments("reverse_geocode")?;
    let location = instance.try_reverse_geocode(Coordinate::new(args.lat, args.lon))?;
    Ok(serde_json::to_value(location)?)
}

fn get_tile(instance: &Instance, request: &CommandRequest) -> Result<Value, DispatchError> {
    let args: TileArgs = request.arguments("get_tile")?;
    Ok(serde_json::to_value(instance.try_get_tile(args.z, args.x, args.y)?)?)
}

fn get_glyph(instance: &Instance, request: &CommandRequest) -> Result<Value, DispatchError> {
    let path = request.arguments::<PathArgs>("get_glyph")?.require()?;
    Ok(serde_json::to_value(instance.try_get_glyph(&path)?)?)
}

fn api_get(instance: &Instance, request: &CommandRequest) -> Result<Value, DispatchError> {
    let path = request.arguments::<PathArgs>("api_get")?.require()?;
    match instance.dispatch(&path)? {
        Dispatch::Payload(payload) => Ok(payload),
        Dispatch::Unavailable(unavailable) => {
            debug!(target: DISPATCH_TARGET, %path, %unavailable, "endpoint unavailable");
            Ok(Value::Null)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn command_names_are_unique() {
        let names: HashSet<_> = command_names().collect();
        assert_eq!(names.len(), COMMANDS.len());
    }

    #[rstest]
    #[case::missing(None)]
    #[case::empty(Some(String::new()))]
    fn empty_paths_are_missing(#[case] path: Option<String>) {
        let error = PathArgs { path }.require().expect_err("path is required");
        assert_eq!(error.to_string(), "Missing path");
    }

    #[rstest]
    fn optional_plan_fields_default_to_absent() {
        let request = CommandRequest::parse(
            br#"{"cmd":"plan_route","from_lat":59.33,"from_lon":18.06,"to_lat":59.32,"to_lon":18.07}"#,
        )
        .expect("parse request");
        let args: PlanRouteArgs = request.arguments("plan_route").expect("decode arguments");
        assert!(args.time.is_none());
        assert!(args.num_itineraries.is_none());
    }
}
