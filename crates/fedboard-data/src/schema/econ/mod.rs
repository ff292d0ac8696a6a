pub mod fred;
pub mod trading_economics;
