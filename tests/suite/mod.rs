mod boundary_scenarios;
mod config_policy;
