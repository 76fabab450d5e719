use crate::binding::ReceiveFilter;
use crate::error::{RelayError, Result};
use crate::logging::LogSink;
use clap::{App, AppSettings, Arg, ArgMatches};

/// Everything the relay needs to start. Built once from the command line and never changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayConfig {
    pub router_iface: String,
    pub wan_iface: String,
    pub filter: ReceiveFilter,
    pub log_sink: LogSink,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Run(RelayConfig),
    Version,
}

pub fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("eapol-relay")
        .author("eapol-relay contributors")
        .about("Relay 802.1X EAPOL frames between an ONT and a router")
        .setting(AppSettings::DisableVersion)
        .arg(
            Arg::with_name("if-router")
                .long("if-router")
                .value_name("IFACE")
                .help("Interface facing the router that answers the 802.1X handshake")
                .required_unless("show-version")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("if-wan")
                .long("if-wan")
                .value_name("IFACE")
                .help("Interface facing the ONT/WAN that starts the 802.1X handshake")
                .required_unless("show-version")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("promiscuous")
                .long("promiscuous")
                .help("Place interfaces into promiscuous mode instead of joining the PAE multicast group"),
        )
        .arg(
            Arg::with_name("syslog")
                .long("syslog")
                .help("Log to syslog"),
        )
        .arg(
            Arg::with_name("show-version")
                .long("version")
                .help("Display version"),
        )
}

impl Command {
    pub fn from_matches(matches: &ArgMatches) -> Result<Command> {
        if matches.is_present("show-version") {
            return Ok(Command::Version);
        }

        let router_iface = required(matches, "if-router")?;
        let wan_iface = required(matches, "if-wan")?;
        if router_iface == wan_iface {
            return Err(RelayError::Config(format!(
                "--if-router and --if-wan must name different interfaces, both are {}",
                router_iface
            )));
        }

        let log_sink = if matches.is_present("syslog") {
            LogSink::Syslog
        } else {
            LogSink::Console
        };

        Ok(Command::Run(RelayConfig {
            router_iface,
            wan_iface,
            filter: ReceiveFilter::from_promiscuous(matches.is_present("promiscuous")),
            log_sink,
        }))
    }
}

fn required(matches: &ArgMatches, name: &str) -> Result<String> {
    match matches.value_of(name) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(RelayError::Config(format!("--{} is required", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eapol_packets::PAE_GROUP_ADDR;

    fn parse(args: &[&str]) -> Result<Command> {
        let matches = app()
            .get_matches_from_safe(std::iter::once("eapol-relay").chain(args.iter().cloned()))
            .map_err(|err| RelayError::Config(err.message))?;
        Command::from_matches(&matches)
    }

    #[test]
    fn defaults_to_multicast_and_console() {
        let command = parse(&["--if-router", "eth1", "--if-wan", "eth0"]).unwrap();
        assert_eq!(
            command,
            Command::Run(RelayConfig {
                router_iface: "eth1".to_string(),
                wan_iface: "eth0".to_string(),
                filter: ReceiveFilter::MulticastGroup(PAE_GROUP_ADDR),
                log_sink: LogSink::Console,
            })
        );
    }

    #[test]
    fn promiscuous_and_syslog() {
        let command = parse(&[
            "--if-router=eth1",
            "--if-wan=eth0",
            "--promiscuous",
            "--syslog",
        ])
        .unwrap();
        match command {
            Command::Run(config) => {
                assert_eq!(config.filter, ReceiveFilter::Promiscuous);
                assert_eq!(config.log_sink, LogSink::Syslog);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn version_needs_no_interfaces() {
        assert_eq!(parse(&["--version"]).unwrap(), Command::Version);
    }

    #[test]
    fn missing_interface_is_a_config_error() {
        match parse(&["--if-router", "eth1"]) {
            Err(RelayError::Config(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
        match parse(&[]) {
            Err(RelayError::Config(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn empty_interface_is_a_config_error() {
        match parse(&["--if-router=", "--if-wan=eth0"]) {
            Err(RelayError::Config(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn same_interface_twice_is_a_config_error() {
        match parse(&["--if-router", "eth0", "--if-wan", "eth0"]) {
            Err(RelayError::Config(message)) => assert!(message.contains("eth0")),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
