mod basket;

pub use basket::{Basket, BasketState};
