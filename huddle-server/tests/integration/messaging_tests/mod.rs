mod test_ordering_preserved;
mod test_sender_is_stamped;
mod test_unreachable_target_dropped;
