//! Analytics facts and dashboard views

pub mod facts;
pub mod metrics;

pub use facts::{
    CustomerFact, DayCount, HourCount, ItemCount, ItemSales, OrderFact, RestaurantCount,
    RestaurantFact, RiderFact,
};
pub use metrics::{
    CustomerMetrics, DateAmount, DateCount, OrderMetrics, PeriodComparison, RankedEntity,
    RestaurantMetrics, RiderMetrics, TimeSeries, TopCustomer, Trend,
};
