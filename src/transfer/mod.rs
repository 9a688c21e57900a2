//! Bounded block streaming between the cart and an image file.

pub mod transfer;

#[cfg(test)]
mod tests;
