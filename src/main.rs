/*
 * LivePaper Client
 * Copyright (C) 2025 Akaere Networks
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;

use livepaper::config::{Cli, Command, PayoffCommand, PayoffCreateArgs, PayoffKindArg, TriggerCommand};
use livepaper::core::logger::init_from_args;
use livepaper::{
    Config, Image, LivePaperClient, Payoff, PayoffAttributes, PayoffType, Trigger, TriggerAttributes,
    Watermark, log_debug, log_info,
};

fn main() -> Result<()> {
    // .env is optional
    let _ = dotenv::dotenv();

    let args = Cli::parse();
    init_from_args(args.debug, args.journald)?;

    let config = Config::from_env().context("Failed to load LivePaper configuration")?;
    log_debug!("Using LivePaper endpoints {:?}", config.endpoints);
    let client = LivePaperClient::from_config(config)?;

    match args.command {
        Command::Upload { url } => {
            println!("{}", Image::upload(&client, &url));
        }
        Command::Payoff(PayoffCommand::Get { id }) => match Payoff::get(&client, &id) {
            Some(payoff) => print_json(&payoff)?,
            None => bail!("Payoff {} not found", id),
        },
        Command::Payoff(PayoffCommand::Create(create)) => {
            let mut payoff = build_payoff(create)?;
            payoff.save(&client)?;
            log_info!("Created payoff {}", payoff.id.as_deref().unwrap_or("-"));
            print_json(&payoff)?;
        }
        Command::Trigger(TriggerCommand::Get { id }) => match Trigger::find(&client, &id) {
            Some(trigger) => print_json(&trigger)?,
            None => bail!("Trigger {} not found", id),
        },
        Command::Trigger(TriggerCommand::Create {
            name,
            strength,
            image_url,
            subscription,
        }) => {
            let image_url = Image::upload(&client, &image_url);
            let mut trigger = Trigger::new(TriggerAttributes {
                id: None,
                name: Some(name),
                watermark: Some(Watermark::new(strength, image_url)),
                subscription: subscription.map(serde_json::Value::String),
            });
            trigger.save(&client)?;
            log_info!("Created trigger {}", trigger.id.as_deref().unwrap_or("-"));
            print_json(&trigger)?;
        }
        Command::Trigger(TriggerCommand::Watermark { id, output }) => {
            let trigger = Trigger {
                id: Some(id),
                ..Trigger::default()
            };
            let image = trigger.download_watermark(&client)?;
            std::fs::write(&output, &image).with_context(|| format!("Failed to write {}", output))?;
            println!("{} ({} bytes)", output, image.len());
        }
    }

    Ok(())
}

fn build_payoff(args: PayoffCreateArgs) -> Result<Payoff> {
    let payoff_type = match args.kind {
        PayoffKindArg::Web => PayoffType::Web,
        PayoffKindArg::Rich => PayoffType::Rich,
    };

    let data = args
        .data
        .map(|raw| serde_json::from_str(&raw).context("--data must be a JSON document"))
        .transpose()?;

    Ok(Payoff::new(PayoffAttributes {
        id: None,
        name: Some(args.name),
        payoff_type: Some(payoff_type.to_string()),
        url: Some(args.url),
        data_type: args.data_type,
        data,
    }))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
