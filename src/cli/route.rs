//! Route command implementation

use crate::analyzer::{ContentPart, Message, Role};
use crate::cli::output::{format_decision, format_decision_json};
use crate::cli::{load_config, RouteArgs};
use crate::config::SwitchyardConfig;
use crate::routing::Router;

/// Apply `route` flags on top of loaded configuration.
fn apply_overrides(config: &mut SwitchyardConfig, args: &RouteArgs) {
    if args.prefer_local {
        config.routing.prefer_local = true;
    }
    if args.prefer_speed {
        config.routing.prefer_speed = true;
    }
}

/// Messages for the prompt, images and optional system message.
pub fn build_messages(args: &RouteArgs) -> Vec<Message> {
    let mut messages = Vec::new();
    if let Some(system) = &args.system {
        messages.push(Message::system(system.as_str()));
    }

    if args.images.is_empty() {
        messages.push(Message::user(args.prompt.as_str()));
    } else {
        let mut parts = vec![ContentPart::text(args.prompt.as_str())];
        parts.extend(args.images.iter().map(|url| ContentPart::image_url(url.as_str())));
        messages.push(Message::with_parts(Role::User, parts));
    }

    messages
}

/// Handle `switchyard route`
pub fn handle_route(args: &RouteArgs) -> anyhow::Result<String> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, args);
    config.validate()?;

    route_with_config(&config, args)
}

pub(crate) fn route_with_config(
    config: &SwitchyardConfig,
    args: &RouteArgs,
) -> anyhow::Result<String> {
    let router = Router::from_config(config)?;
    let decision = router.route(&build_messages(args), args.task_type)?;

    if args.json {
        Ok(format_decision_json(&decision)?)
    } else {
        Ok(format_decision(&decision))
    }
}
