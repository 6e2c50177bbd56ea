//! Operator CLI. Commands mirror what a host does at request time so extra
//! passwords can be checked from a shell.

use std::env;
use std::process::ExitCode;

use log::info;
use postpass_rs::config::load_config;
use postpass_rs::credentials::{cookie_name, ConfiguredExtras, RequestContext, UnlockFlow};
use postpass_rs::crypto::passwords::hash_password;

fn print_usage() -> ExitCode {
    eprintln!("Commands:\n  hash-password <plaintext>\n  cookie-name <site-url>\n  check <config-path> <resource-id> <proof>\n  validate <config-path>");
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return print_usage();
    }

    match args[1].as_str() {
        "hash-password" => {
            if args.len() != 3 {
                return print_usage();
            }
            match hash_password(&args[2]) {
                Ok(hash) => println!("{hash}"),
                Err(err) => {
                    eprintln!("hashing failed: {err}");
                    return ExitCode::FAILURE;
                }
            }
        }
        "cookie-name" => {
            if args.len() != 3 {
                return print_usage();
            }
            println!("{}", cookie_name(&args[2]));
        }
        "check" => {
            if args.len() != 5 {
                return print_usage();
            }
            let config = match load_config(&args[2]) {
                Ok(cfg) => cfg,
                Err(err) => {
                    eprintln!("config load failed: {err}");
                    return ExitCode::FAILURE;
                }
            };
            let resource = match config.require(&args[3]) {
                Ok(resource) => resource,
                Err(err) => {
                    eprintln!("{err}");
                    return ExitCode::FAILURE;
                }
            };

            let flow = UnlockFlow::new(&config.site_url).with_provider(ConfiguredExtras::new(&config));
            let request = RequestContext::new().with_cookie(flow.cookie_name(), args[4].as_str());
            let outcome = if flow.resolve(resource, &request).is_substituted() {
                "matched"
            } else if resource.is_protected() && flow.is_unlocked(resource, &request) {
                "primary"
            } else {
                "no-match"
            };
            info!("resource {} resolved to {}", resource.id, outcome);
            println!("{outcome}");
        }
        "validate" => {
            if args.len() != 3 {
                return print_usage();
            }
            let config = match load_config(&args[2]) {
                Ok(cfg) => cfg,
                Err(err) => {
                    eprintln!("config load failed: {err}");
                    return ExitCode::FAILURE;
                }
            };
            let diagnostics = config.diagnostics();
            if diagnostics.is_empty() {
                println!("ok: {} resource(s), no problems found", config.resources().count());
            } else {
                for (id, diagnostic) in &diagnostics {
                    println!("{id}: {diagnostic}");
                }
                return ExitCode::FAILURE;
            }
        }
        _ => return print_usage(),
    }

    ExitCode::SUCCESS
}
