mod filter;
mod frame;
mod registers;
mod status;
