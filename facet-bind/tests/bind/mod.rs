mod inheritance;
mod nulls;
mod optional;
mod single;
