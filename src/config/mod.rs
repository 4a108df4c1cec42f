mod config;

pub use self::config::{
    PriceSettings, RpcSettings, SchedulerSettings, Settings, StatsSettings, StatsTarget,
};
