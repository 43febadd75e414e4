mod schedule_test;
