mod test_third_join_rejected;
